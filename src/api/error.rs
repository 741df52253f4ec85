//! Erros de transporte do cliente HTTP do backend de sessões de trabalho.
//!
//! Define [`ApiError`] com variantes para respostas HTTP inesperadas, falhas
//! de rede e registros de sessão inconsistentes. Rejeições do ciclo de vida
//! (400/403/404/409/422) não chegam aqui: são traduzidas para
//! [`LifecycleError`](crate::lifecycle::LifecycleError) pelo cliente.

use thiserror::Error;

/// Erros que podem ocorrer ao falar com o backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resposta HTTP fora do mapeamento do ciclo de vida (ex.: 500).
    /// Contém o código de status e a mensagem extraída do corpo.
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// O backend devolveu uma sessão cujas flags violam as implicações
    /// (ex.: `work_started` sem `start_approved`) ou falta um timestamp.
    #[error("malformed session record: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let err = ApiError::Status {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(
            err.to_string(),
            "backend returned status 500: Internal Server Error"
        );
    }

    #[test]
    fn malformed_display() {
        let err = ApiError::Malformed("session 7 missing started_at".into());
        assert_eq!(
            err.to_string(),
            "malformed session record: session 7 missing started_at"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
