mod error;
mod phase;
mod session;

pub use error::LifecycleError;
pub use phase::{permitted_action, Action, ApprovalFlags, Lifecycle, Phase, Transition};
pub use session::{
    hours_between, Actor, Application, ApplicationStatus, JobId, Role, SessionId, Shift, Stage,
    UserId, WorkSession,
};
