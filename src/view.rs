//! Serializable UI state, kept apart from the domain sessions.
//!
//! The sessions themselves remain the source of truth; a [`SessionView`] is
//! recomputed from one on every refresh and never edited in place.
//! [`ViewState`] tracks the one action a client may have in flight and hands
//! out [`Ticket`]s so that a response arriving after a newer refresh, or
//! after the user left the page, is dropped instead of applied.
//!
//! [`WorkTracker`](crate::tracker::WorkTracker) awaits each request before
//! issuing the next, so it never observes a stale ticket. Tickets matter to
//! callers that keep several requests outstanding against one `ViewState`,
//! such as an event loop that spawns each request and lets the user leave.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::{permitted_action, Action, Phase, Role, SessionId, WorkSession};
use crate::summary::Summary;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{action} is already in progress, wait for it to finish")]
    Busy { action: Action },
}

/// `RWF 5,000`
pub fn format_rwf(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("RWF {grouped}")
}

/// Guidance shown next to a session when the caller has nothing to click.
fn hint(phase: Phase, role: Role) -> Option<&'static str> {
    match (phase, role) {
        (Phase::PendingStartApproval, Role::Worker) => Some(
            "Waiting for employer approval to start work. Do not begin work until approved.",
        ),
        (Phase::PendingEndApproval, Role::Worker) => {
            Some("Waiting for employer approval to complete this session.")
        }
        (Phase::ReadyToStart, Role::Employer) => Some("Approved. Waiting for the worker to start."),
        (Phase::InProgress, Role::Employer) => Some("Work is underway."),
        _ => None,
    }
}

/// What the interface renders for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: SessionId,
    pub title: String,
    pub counterpart: Option<String>,
    pub phase: Phase,
    pub label: String,
    pub next_action: Option<Action>,
    pub hint: Option<String>,
    pub daily_payment: String,
    pub hours_worked: Option<f64>,
    pub notes: Vec<(String, String)>,
    pub created_at: DateTime<Utc>,
}

impl SessionView {
    pub fn new(session: &WorkSession, role: Role) -> Self {
        let phase = session.phase();
        let counterpart = match role {
            Role::Worker => session.employer_name.clone(),
            Role::Employer => Some(format!("Worker {}", session.worker_id)),
        };
        let notes = [
            ("Worker notes", &session.worker_notes),
            ("Employer start notes", &session.employer_start_notes),
            ("Employer end notes", &session.employer_end_notes),
        ]
        .into_iter()
        .filter_map(|(label, text)| text.as_ref().map(|t| (label.to_string(), t.clone())))
        .collect();

        Self {
            id: session.id.clone(),
            title: session
                .job_title
                .clone()
                .unwrap_or_else(|| format!("Job {}", session.job_id)),
            counterpart,
            phase,
            label: phase.label().to_string(),
            next_action: permitted_action(phase, role),
            hint: hint(phase, role).map(str::to_string),
            daily_payment: format_rwf(session.daily_payment),
            hours_worked: session.hours_worked(),
            notes,
            created_at: session.created_at,
        }
    }
}

/// Identifies one request issued through the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket(u64);

/// The action currently awaiting a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InFlight {
    pub action: Action,
    pub session_id: Option<SessionId>,
    pub ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub role: Role,
    pub sessions: Vec<SessionView>,
    pub summary: Option<Summary>,
    pub in_flight: Option<InFlight>,
    pub last_error: Option<String>,
    /// Last ticket handed out.
    issued: u64,
    /// Ticket of the refresh currently shown.
    shown: u64,
    /// Responses to tickets at or below this are discarded.
    cutoff: u64,
}

impl ViewState {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            sessions: Vec::new(),
            summary: None,
            in_flight: None,
            last_error: None,
            issued: 0,
            shown: 0,
            cutoff: 0,
        }
    }

    fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Reserve the single action slot. A second action while one is pending
    /// is refused rather than queued.
    pub fn begin(&mut self, action: Action, session_id: Option<&str>) -> Result<Ticket, ViewError> {
        if let Some(current) = &self.in_flight {
            return Err(ViewError::Busy {
                action: current.action,
            });
        }
        let ticket = self.issue();
        self.in_flight = Some(InFlight {
            action,
            session_id: session_id.map(str::to_string),
            ticket,
        });
        self.last_error = None;
        Ok(ticket)
    }

    /// Release the action slot held by `ticket`. Returns false when the
    /// ticket no longer owns it.
    pub fn finish(&mut self, ticket: Ticket, error: Option<String>) -> bool {
        match &self.in_flight {
            Some(current) if current.ticket == ticket => {
                self.in_flight = None;
                self.last_error = error;
                true
            }
            _ => false,
        }
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        self.issue()
    }

    /// Replace the displayed sessions unless a newer refresh already landed
    /// or the view was abandoned after this request went out.
    pub fn apply_refresh(
        &mut self,
        ticket: Ticket,
        sessions: &[WorkSession],
        summary: Summary,
    ) -> bool {
        if ticket.0 <= self.shown || ticket.0 <= self.cutoff {
            return false;
        }
        self.shown = ticket.0;
        self.sessions = sessions
            .iter()
            .map(|s| SessionView::new(s, self.role))
            .collect();
        self.summary = Some(summary);
        true
    }

    /// The user navigated away: every outstanding response becomes stale.
    pub fn leave(&mut self) {
        self.cutoff = self.issued;
        self.in_flight = None;
    }

    pub fn session(&self, id: &str) -> Option<&SessionView> {
        self.sessions.iter().find(|s| s.id == id)
    }
}
