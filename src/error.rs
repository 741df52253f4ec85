use thiserror::Error;

use crate::api::ApiError;
use crate::lifecycle::LifecycleError;
use crate::view::ViewError;

#[derive(Debug, Error)]
pub enum WorkTrackError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    View(#[from] ViewError),
}

impl WorkTrackError {
    /// The lifecycle rejection behind this error, if it is one.
    pub fn lifecycle(&self) -> Option<&LifecycleError> {
        match self {
            WorkTrackError::Lifecycle(err) => Some(err),
            _ => None,
        }
    }

    /// True when the store refused the action because the session had
    /// already moved on, so the caller's view is stale.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self.lifecycle(),
            Some(LifecycleError::InvalidTransition { .. } | LifecycleError::ApprovalPending)
        )
    }
}

pub type Result<T> = std::result::Result<T, WorkTrackError>;
