//! Interface de terminal do worktrack: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner exibido enquanto uma ação aguarda
//! o backend e `console` para estilização com cores. O [`ActionProgress`]
//! acompanha visualmente uma ação; as funções `print_*` renderizam o
//! [`ViewState`] como a página de acompanhamento de trabalho.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::{Action, Application, Phase, Transition, WorkSession};
use crate::summary::Summary;
use crate::view::{format_rwf, SessionView, ViewState};

/// Indicador visual de progresso para uma ação enquanto a requisição está pendente.
///
/// Exibe um spinner animado durante a espera e mensagens coloridas para
/// sucesso (verde) e rejeição (vermelho).
pub struct ActionProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
}

impl ActionProgress {
    /// Inicia o spinner com a descrição da ação e retorna a instância de progresso.
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Finaliza o spinner e exibe a sessão resultante.
    pub fn succeed(&self, action: Action, session: &WorkSession) {
        self.pb.finish_and_clear();
        println!(
            "  {} {action}: session {} is now {}",
            self.green.apply_to("✓"),
            session.id,
            phase_style(session.phase()).apply_to(session.phase())
        );
    }

    /// Finaliza o spinner e exibe o motivo da rejeição.
    pub fn fail(&self, reason: &str) {
        self.pb.finish_and_clear();
        println!("  {} {reason}", self.red.apply_to("✗"));
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Cor associada a cada fase na listagem.
fn phase_style(phase: Phase) -> Style {
    match phase {
        Phase::PendingStartApproval => Style::new().yellow(),
        Phase::ReadyToStart => Style::new().blue(),
        Phase::InProgress => Style::new().green(),
        Phase::PendingEndApproval => Style::new().color256(208),
        Phase::Completed => Style::new().magenta(),
    }
}

/// Imprime uma transição aplicada (usado pela demonstração).
pub fn print_transition(transition: &Transition) {
    println!(
        "  {} → {}  ({})",
        phase_style(transition.from).apply_to(transition.from),
        phase_style(transition.to).apply_to(transition.to).bold(),
        transition.action
    );
}

/// Imprime os cartões de resumo.
pub fn print_summary(summary: &Summary) {
    let bold = Style::new().bold();
    println!();
    println!("{}", bold.apply_to("─── Summary ───"));
    println!("  Total Sessions      {}", summary.total_sessions);
    println!("  Completed Sessions  {}", summary.approved_sessions);
    println!("  Pending Start       {}", summary.pending_start_approval);
    println!("  Pending End         {}", summary.pending_end_approval);
    println!(
        "  Total Earnings      {}",
        Style::new().magenta().bold().apply_to(format_rwf(summary.total_earnings))
    );
}

fn print_session(view: &SessionView) {
    let dim = Style::new().dim();
    println!();
    println!(
        "{}  {}",
        Style::new().bold().apply_to(&view.title),
        phase_style(view.phase).apply_to(format!("[{}]", view.label))
    );
    if let Some(counterpart) = &view.counterpart {
        println!("  {}", dim.apply_to(counterpart));
    }
    println!(
        "  id {}  ·  {} / day  ·  created {}",
        view.id,
        view.daily_payment,
        view.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(hours) = view.hours_worked {
        println!("  Hours worked: {hours} hrs");
    }
    for (label, text) in &view.notes {
        println!("  {}: {text}", dim.apply_to(label));
    }
    match (view.next_action, &view.hint) {
        (Some(action), _) => println!("  → next: {}", Style::new().cyan().apply_to(action)),
        (None, Some(hint)) => println!("  {}", Style::new().yellow().apply_to(hint)),
        (None, None) => {}
    }
}

/// Imprime a página completa: sessões, resumo e o último erro, se houver.
pub fn print_view(view: &ViewState) {
    if view.sessions.is_empty() {
        println!("No work sessions yet.");
    }
    for session in &view.sessions {
        print_session(session);
    }
    if let Some(summary) = &view.summary {
        print_summary(summary);
    }
    if let Some(error) = &view.last_error {
        println!("\n  {} {error}", Style::new().red().bold().apply_to("✗"));
    }
}

/// Imprime os trabalhos aceitos para os quais uma sessão pode ser aberta.
pub fn print_jobs(applications: &[Application]) {
    if applications.is_empty() {
        println!("No accepted applications.");
        return;
    }
    for app in applications {
        let title = app.job_title.as_deref().unwrap_or("(untitled job)");
        match &app.job_company {
            Some(company) => println!("  {}  {title} - {company}", app.job_id),
            None => println!("  {}  {title}", app.job_id),
        }
    }
}
