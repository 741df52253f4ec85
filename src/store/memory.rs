use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use super::{NewSession, SessionStore};
use crate::error::Result;
use crate::lifecycle::{
    Action, Actor, Application, ApplicationStatus, Lifecycle, LifecycleError, WorkSession,
};
use crate::summary::{Scope, Summary};

#[derive(Debug, Default)]
struct Inner {
    sessions: Vec<WorkSession>,
    applications: Vec<Application>,
}

/// Authoritative in-process store.
///
/// Every call runs under one lock, so transitions on the same session are
/// linearized. Sessions are never removed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_applications(applications: impl IntoIterator<Item = Application>) -> Self {
        let store = Self::new();
        store.lock().applications.extend(applications);
        store
    }

    /// Record an application decided by the applications service.
    pub fn add_application(&self, application: Application) {
        self.lock().applications.push(application);
    }

    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    async fn create_session(&self, actor: &Actor, request: &NewSession) -> Result<WorkSession> {
        let mut inner = self.lock();
        let session = Lifecycle::create(
            actor,
            &request.job_id,
            request.daily_payment,
            &inner.applications,
            &inner.sessions,
            Utc::now(),
        )?;
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn transition(
        &self,
        actor: &Actor,
        session_id: &str,
        action: Action,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        let mut inner = self.lock();
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| LifecycleError::NotFound(session_id.to_string()))?;
        Lifecycle::apply(session, actor, action, notes, Utc::now())?;
        Ok(session.clone())
    }

    async fn list_sessions(&self, scope: &Scope) -> Result<Vec<WorkSession>> {
        let inner = self.lock();
        let mut sessions: Vec<WorkSession> = inner
            .sessions
            .iter()
            .filter(|s| scope.contains(s))
            .cloned()
            .collect();
        // Newest first; insertion order breaks ties.
        sessions.reverse();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(?scope, count = sessions.len(), "Listed work sessions");
        Ok(sessions)
    }

    async fn summary(&self, scope: &Scope) -> Result<Summary> {
        Ok(Summary::for_scope(scope, &self.lock().sessions))
    }

    async fn accepted_applications(&self, worker_id: &str) -> Result<Vec<Application>> {
        Ok(self
            .lock()
            .applications
            .iter()
            .filter(|a| a.worker_id == worker_id && a.status == ApplicationStatus::Accepted)
            .cloned()
            .collect())
    }
}
