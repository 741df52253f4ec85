use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::LifecycleError;
use super::session::{
    Actor, Application, ApplicationStatus, JobId, Role, SessionId, Shift, Stage, WorkSession,
};

/// The four booleans a session's phase is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalFlags {
    pub start_approved: bool,
    pub work_started: bool,
    pub work_ended: bool,
    pub end_approved: bool,
}

impl ApprovalFlags {
    /// Every later flag implies the one before it.
    pub fn is_consistent(&self) -> bool {
        (!self.work_started || self.start_approved)
            && (!self.work_ended || self.work_started)
            && (!self.end_approved || self.work_ended)
    }

    /// True when no flag set in `self` is unset in `next`.
    pub fn never_reverts_to(&self, next: &ApprovalFlags) -> bool {
        (!self.start_approved || next.start_approved)
            && (!self.work_started || next.work_started)
            && (!self.work_ended || next.work_ended)
            && (!self.end_approved || next.end_approved)
    }
}

/// The five mutually exclusive, totally ordered lifecycle phases.
///
/// PENDING_START_APPROVAL → READY_TO_START → IN_PROGRESS → PENDING_END_APPROVAL → COMPLETED
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PendingStartApproval,
    ReadyToStart,
    InProgress,
    PendingEndApproval,
    Completed,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::PendingStartApproval,
        Phase::ReadyToStart,
        Phase::InProgress,
        Phase::PendingEndApproval,
        Phase::Completed,
    ];

    pub fn from_flags(flags: ApprovalFlags) -> Phase {
        if flags.end_approved {
            Phase::Completed
        } else if flags.work_ended {
            Phase::PendingEndApproval
        } else if flags.work_started {
            Phase::InProgress
        } else if flags.start_approved {
            Phase::ReadyToStart
        } else {
            Phase::PendingStartApproval
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::PendingStartApproval => "Pending Start Approval",
            Phase::ReadyToStart => "Ready to Start",
            Phase::InProgress => "Work In Progress",
            Phase::PendingEndApproval => "Pending End Approval",
            Phase::Completed => "Completed & Paid",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A request to move a session forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    ApproveStart,
    RequestStart,
    RequestEnd,
    ApproveEnd,
}

impl Action {
    /// The party allowed to issue this action.
    pub fn role(self) -> Role {
        match self {
            Action::Create | Action::RequestStart | Action::RequestEnd => Role::Worker,
            Action::ApproveStart | Action::ApproveEnd => Role::Employer,
        }
    }

    /// Route segment used by the REST backend.
    pub fn path_segment(self) -> &'static str {
        match self {
            Action::Create => "",
            Action::ApproveStart => "approve-start",
            Action::RequestStart => "request-start",
            Action::RequestEnd => "request-end",
            Action::ApproveEnd => "approve-end",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create a session"),
            Action::ApproveStart => write!(f, "approve start"),
            Action::RequestStart => write!(f, "start work"),
            Action::RequestEnd => write!(f, "end work"),
            Action::ApproveEnd => write!(f, "approve end"),
        }
    }
}

/// The single action `role` may take next from `phase`, if any.
pub fn permitted_action(phase: Phase, role: Role) -> Option<Action> {
    match (phase, role) {
        (Phase::PendingStartApproval, Role::Employer) => Some(Action::ApproveStart),
        (Phase::ReadyToStart, Role::Worker) => Some(Action::RequestStart),
        (Phase::InProgress, Role::Worker) => Some(Action::RequestEnd),
        (Phase::PendingEndApproval, Role::Employer) => Some(Action::ApproveEnd),
        _ => None,
    }
}

/// A phase change applied to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub session_id: SessionId,
    pub action: Action,
    pub from: Phase,
    pub to: Phase,
}

/// Drives a `WorkSession` through the approval handshake.
pub struct Lifecycle;

impl Lifecycle {
    /// Open a new session for `job_id` on behalf of `worker`.
    ///
    /// The worker must hold an accepted application for the job, and no
    /// session for the same job and worker may still be open.
    pub fn create<'a>(
        worker: &Actor,
        job_id: &str,
        daily_payment: u64,
        applications: impl IntoIterator<Item = &'a Application>,
        existing: impl IntoIterator<Item = &'a WorkSession>,
        now: DateTime<Utc>,
    ) -> Result<WorkSession, LifecycleError> {
        if worker.role != Role::Worker {
            return Err(LifecycleError::Unauthorized {
                action: Action::Create,
                expected: Role::Worker.as_str(),
            });
        }
        if daily_payment == 0 {
            return Err(LifecycleError::InvalidPayment);
        }

        let application = applications
            .into_iter()
            .find(|a| {
                a.job_id == job_id
                    && a.worker_id == worker.id
                    && a.status == ApplicationStatus::Accepted
            })
            .ok_or_else(|| LifecycleError::InvalidApplication {
                job_id: job_id.to_string(),
            })?;

        if let Some(open) = existing
            .into_iter()
            .find(|s| s.job_id == job_id && s.worker_id == worker.id && s.is_open())
        {
            return Err(LifecycleError::DuplicateSession {
                job_id: job_id.to_string(),
                session_id: Some(open.id.clone()),
            });
        }

        let mut session = WorkSession::new(
            JobId::from(job_id),
            worker.id.clone(),
            application.employer_id.clone(),
            daily_payment,
            now,
        );
        session.job_title = application.job_title.clone();
        info!(
            session_id = %session.id,
            job_id = %job_id,
            worker_id = %worker.id,
            daily_payment,
            "Work session created"
        );
        Ok(session)
    }

    /// Apply `action` as `actor` at time `now`.
    ///
    /// Authorization is checked before the phase guard. A rejected action
    /// leaves the session untouched.
    pub fn apply(
        session: &mut WorkSession,
        actor: &Actor,
        action: Action,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Transition, LifecycleError> {
        let expected = action.role();
        let owner = match expected {
            Role::Worker => &session.worker_id,
            Role::Employer => &session.employer_id,
        };
        if actor.role != expected || &actor.id != owner {
            debug!(
                session_id = %session.id,
                actor = %actor.id,
                %action,
                "Rejected action from wrong party"
            );
            return Err(LifecycleError::Unauthorized {
                action,
                expected: expected.as_str(),
            });
        }

        let from = session.phase();
        let next = match (action, session.stage) {
            (Action::ApproveStart, Stage::PendingStartApproval) => Stage::ReadyToStart,
            (Action::RequestStart, Stage::PendingStartApproval) => {
                return Err(LifecycleError::ApprovalPending);
            }
            (Action::RequestStart, Stage::ReadyToStart) => Stage::InProgress { started_at: now },
            (Action::RequestEnd, Stage::InProgress { started_at }) => Stage::PendingEndApproval {
                shift: Shift::new(started_at, now),
            },
            (Action::ApproveEnd, Stage::PendingEndApproval { shift }) => Stage::Completed { shift },
            _ => {
                return Err(LifecycleError::InvalidTransition {
                    action,
                    phase: Some(from),
                });
            }
        };

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        match action {
            Action::ApproveStart => session.employer_start_notes = notes,
            Action::ApproveEnd => session.employer_end_notes = notes,
            Action::RequestStart | Action::RequestEnd => {
                if notes.is_some() {
                    session.worker_notes = notes;
                }
            }
            Action::Create => {}
        }
        session.stage = next;

        let to = session.phase();
        info!(session_id = %session.id, %action, %from, %to, "Work session advanced");
        Ok(Transition {
            session_id: session.id.clone(),
            action,
            from,
            to,
        })
    }

    pub fn approve_start(
        session: &mut WorkSession,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Transition, LifecycleError> {
        Self::apply(session, actor, Action::ApproveStart, notes, Utc::now())
    }

    pub fn request_start(
        session: &mut WorkSession,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Transition, LifecycleError> {
        Self::apply(session, actor, Action::RequestStart, notes, Utc::now())
    }

    pub fn request_end(
        session: &mut WorkSession,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Transition, LifecycleError> {
        Self::apply(session, actor, Action::RequestEnd, notes, Utc::now())
    }

    pub fn approve_end(
        session: &mut WorkSession,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<Transition, LifecycleError> {
        Self::apply(session, actor, Action::ApproveEnd, notes, Utc::now())
    }
}
