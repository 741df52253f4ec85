//! Per-worker and per-employer counts derived from a set of sessions.
//!
//! Always recomputed from the sessions passed in; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::lifecycle::{Phase, UserId, WorkSession};

/// Whose sessions a listing or summary covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Scope {
    Worker(UserId),
    Employer(UserId),
}

impl Scope {
    pub fn contains(&self, session: &WorkSession) -> bool {
        match self {
            Scope::Worker(id) => &session.worker_id == id,
            Scope::Employer(id) => &session.employer_id == id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_sessions: u64,
    /// Sessions whose end the employer approved.
    pub approved_sessions: u64,
    pub pending_start_approval: u64,
    pub pending_end_approval: u64,
    /// Sum of `daily_payment` over completed sessions, in RWF. Saturates at
    /// `u64::MAX`.
    pub total_earnings: u64,
    #[serde(default)]
    pub ready_to_start: u64,
    #[serde(default)]
    pub in_progress: u64,
}

impl Summary {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a WorkSession>) -> Self {
        let mut summary = Summary::default();
        for session in sessions {
            summary.total_sessions += 1;
            match session.phase() {
                Phase::PendingStartApproval => summary.pending_start_approval += 1,
                Phase::ReadyToStart => summary.ready_to_start += 1,
                Phase::InProgress => summary.in_progress += 1,
                Phase::PendingEndApproval => summary.pending_end_approval += 1,
                Phase::Completed => {
                    summary.approved_sessions += 1;
                    summary.total_earnings =
                        summary.total_earnings.saturating_add(session.daily_payment);
                }
            }
        }
        summary
    }

    /// Summarize only the sessions that fall inside `scope`.
    pub fn for_scope<'a>(
        scope: &Scope,
        sessions: impl IntoIterator<Item = &'a WorkSession>,
    ) -> Self {
        Self::from_sessions(sessions.into_iter().filter(|s| scope.contains(s)))
    }

    pub fn count(&self, phase: Phase) -> u64 {
        match phase {
            Phase::PendingStartApproval => self.pending_start_approval,
            Phase::ReadyToStart => self.ready_to_start,
            Phase::InProgress => self.in_progress,
            Phase::PendingEndApproval => self.pending_end_approval,
            Phase::Completed => self.approved_sessions,
        }
    }
}
