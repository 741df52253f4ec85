use thiserror::Error;

use super::phase::{Action, Phase};

fn while_in(phase: &Option<Phase>) -> String {
    match phase {
        Some(phase) => format!(" while the session is {phase}"),
        None => " from the session's current phase".to_string(),
    }
}

/// Rejections produced by the lifecycle controller.
///
/// Every variant is scoped to the single attempted action. None of them is
/// retried automatically: a repeated `approve_start` on an already approved
/// session fails again with [`LifecycleError::InvalidTransition`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The action is not allowed from the session's current phase.
    /// `phase` is unknown when the rejection came back from a remote store.
    #[error("cannot {action}{}", while_in(.phase))]
    InvalidTransition {
        action: Action,
        phase: Option<Phase>,
    },

    /// The worker tried to start before the employer approved the start.
    #[error("cannot start work until the employer approves the session")]
    ApprovalPending,

    /// The caller is not the party that holds this action.
    #[error("only the session's {expected} may {action}")]
    Unauthorized {
        action: Action,
        expected: &'static str,
    },

    /// No accepted application exists for the job.
    #[error("no accepted application for job {job_id}")]
    InvalidApplication { job_id: String },

    /// An open session already exists for this job and worker.
    #[error("an open work session already exists for job {job_id}")]
    DuplicateSession {
        job_id: String,
        session_id: Option<String>,
    },

    /// Daily payment must be a positive amount.
    #[error("daily payment must be positive")]
    InvalidPayment,

    #[error("work session not found: {0}")]
    NotFound(String),
}
