//! The session store contract and its in-process implementation.
//!
//! A store is the authority over session state: it linearizes transitions
//! on the same session and reports the full resulting session for every
//! mutating call, so callers can re-derive the phase without another round
//! trip. [`MemoryStore`] applies the lifecycle itself; the HTTP client in
//! [`crate::api`] forwards to the remote backend.

mod memory;

pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lifecycle::{Action, Actor, Application, JobId, WorkSession};
use crate::summary::{Scope, Summary};

/// Parameters for opening a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSession {
    pub job_id: JobId,
    /// In RWF, must be positive.
    pub daily_payment: u64,
}

#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn create_session(&self, actor: &Actor, request: &NewSession) -> Result<WorkSession>;

    /// Apply one of the four handshake actions and return the updated session.
    async fn transition(
        &self,
        actor: &Actor,
        session_id: &str,
        action: Action,
        notes: Option<String>,
    ) -> Result<WorkSession>;

    async fn list_sessions(&self, scope: &Scope) -> Result<Vec<WorkSession>>;

    async fn summary(&self, scope: &Scope) -> Result<Summary>;

    /// Applications of `worker_id` that a session may be opened against.
    async fn accepted_applications(&self, worker_id: &str) -> Result<Vec<Application>>;

    async fn approve_start(
        &self,
        actor: &Actor,
        session_id: &str,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        self.transition(actor, session_id, Action::ApproveStart, notes)
            .await
    }

    async fn request_start(
        &self,
        actor: &Actor,
        session_id: &str,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        self.transition(actor, session_id, Action::RequestStart, notes)
            .await
    }

    async fn request_end(
        &self,
        actor: &Actor,
        session_id: &str,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        self.transition(actor, session_id, Action::RequestEnd, notes)
            .await
    }

    async fn approve_end(
        &self,
        actor: &Actor,
        session_id: &str,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        self.transition(actor, session_id, Action::ApproveEnd, notes)
            .await
    }
}
