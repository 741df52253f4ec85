//! Interface de linha de comando do worktrack baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (create, approve-start,
//! start, end, approve-end, list, summary, jobs, demo) e flags globais
//! (--as, --user, --verbose).

use clap::{Parser, Subcommand, ValueEnum};

use crate::lifecycle::{Action, Role};

/// worktrack: acompanhamento de sessões de trabalho com dupla aprovação.
#[derive(Debug, Parser)]
#[command(name = "worktrack", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Papel do usuário nesta execução (sobrescreve `role` do arquivo).
    #[arg(long = "as", global = true)]
    pub role: Option<RoleArg>,

    /// Identificador do usuário (sobrescreve `user_id` do arquivo).
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Argumento de papel aceito pela CLI, mapeado para [`Role`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// Quem executa o trabalho e solicita início/fim.
    Worker,
    /// Quem aprova o início e o fim da sessão.
    Employer,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Worker => Role::Worker,
            RoleArg::Employer => Role::Employer,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Abre uma sessão de trabalho para um trabalho aceito.
    Create {
        /// ID do trabalho com candidatura aceita.
        #[arg(long)]
        job: String,

        /// Pagamento diário em RWF.
        #[arg(long)]
        daily_payment: u64,
    },

    /// Empregador aprova o início da sessão.
    ApproveStart {
        session: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Trabalhador inicia o trabalho (requer aprovação prévia).
    Start {
        session: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Trabalhador encerra o trabalho.
    End {
        session: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Empregador aprova o fim da sessão e finaliza o pagamento.
    ApproveEnd {
        session: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Lista as sessões do usuário com fase e próxima ação.
    List,

    /// Mostra os totais e ganhos.
    Summary,

    /// Lista os trabalhos aceitos disponíveis para abrir sessão.
    Jobs,

    /// Executa a demonstração embutida do ciclo de vida, sem backend.
    Demo,
}

impl Command {
    /// A ação do ciclo de vida correspondente, com sessão e notas.
    pub fn transition(&self) -> Option<(Action, &str, Option<String>)> {
        match self {
            Command::ApproveStart { session, notes } => {
                Some((Action::ApproveStart, session.as_str(), notes.clone()))
            }
            Command::Start { session, notes } => Some((Action::RequestStart, session.as_str(), notes.clone())),
            Command::End { session, notes } => Some((Action::RequestEnd, session.as_str(), notes.clone())),
            Command::ApproveEnd { session, notes } => {
                Some((Action::ApproveEnd, session.as_str(), notes.clone()))
            }
            _ => None,
        }
    }
}
