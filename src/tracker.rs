use tracing::{info, warn};

use crate::error::Result;
use crate::lifecycle::{Action, Actor, Application, Role, WorkSession};
use crate::store::{NewSession, SessionStore};
use crate::summary::Scope;
use crate::view::{Ticket, ViewState};

/// Drives the work-tracking page against a session store.
///
/// Every action goes through the view state's single in-flight slot, and
/// every completed or conflicting action is followed by a fresh read so the
/// next decision is made on the store's current state.
pub struct WorkTracker<S> {
    store: S,
    actor: Actor,
    view: ViewState,
}

impl<S: SessionStore> WorkTracker<S> {
    pub fn new(store: S, actor: Actor) -> Self {
        let view = ViewState::new(actor.role);
        Self { store, actor, view }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Navigate away from the page.
    pub fn leave(&mut self) {
        self.view.leave();
    }

    pub fn scope(&self) -> Scope {
        match self.actor.role {
            Role::Worker => Scope::Worker(self.actor.id.clone()),
            Role::Employer => Scope::Employer(self.actor.id.clone()),
        }
    }

    /// Reload sessions and summary for the caller's scope.
    pub async fn refresh(&mut self) -> Result<&ViewState> {
        let ticket = self.view.begin_refresh();
        let scope = self.scope();
        let sessions = self.store.list_sessions(&scope).await?;
        let summary = self.store.summary(&scope).await?;
        if !self.view.apply_refresh(ticket, &sessions, summary) {
            info!("Discarded stale refresh");
        }
        Ok(&self.view)
    }

    /// Jobs the worker may open a session for.
    pub async fn accepted_jobs(&self) -> Result<Vec<Application>> {
        self.store.accepted_applications(&self.actor.id).await
    }

    pub async fn create(&mut self, job_id: &str, daily_payment: u64) -> Result<WorkSession> {
        let ticket = self.view.begin(Action::Create, None)?;
        let request = NewSession {
            job_id: job_id.to_string(),
            daily_payment,
        };
        let result = self.store.create_session(&self.actor, &request).await;
        self.settle(ticket, result).await
    }

    /// Issue one handshake action on `session_id`.
    pub async fn perform(
        &mut self,
        action: Action,
        session_id: &str,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        let ticket = self.view.begin(action, Some(session_id))?;
        let result = self
            .store
            .transition(&self.actor, session_id, action, notes)
            .await;
        self.settle(ticket, result).await
    }

    async fn settle(
        &mut self,
        ticket: Ticket,
        result: Result<WorkSession>,
    ) -> Result<WorkSession> {
        match result {
            Ok(session) => {
                self.view.finish(ticket, None);
                // The store already committed the action; a failed reload
                // only leaves the page stale.
                if let Err(reload) = self.refresh().await {
                    warn!(error = %reload, session_id = %session.id, "Reload after action failed");
                }
                Ok(session)
            }
            Err(err) => {
                self.view.finish(ticket, Some(err.to_string()));
                if err.is_conflict() {
                    warn!(error = %err, "Action conflicted with current session state, reloading");
                    // The rejection is what gets reported; a failed reload
                    // leaves the previous view in place.
                    if let Err(reload) = self.refresh().await {
                        warn!(error = %reload, "Reload after conflict failed");
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::api::ApiError;
    use crate::error::WorkTrackError;
    use crate::lifecycle::{ApplicationStatus, LifecycleError, Phase};
    use crate::store::MemoryStore;
    use crate::summary::Summary;

    /// Store whose listings fail while `reads_down` is set.
    struct FlakyReads {
        inner: MemoryStore,
        reads_down: AtomicBool,
    }

    impl SessionStore for FlakyReads {
        async fn create_session(&self, actor: &Actor, request: &NewSession) -> Result<WorkSession> {
            self.inner.create_session(actor, request).await
        }

        async fn transition(
            &self,
            actor: &Actor,
            session_id: &str,
            action: Action,
            notes: Option<String>,
        ) -> Result<WorkSession> {
            self.inner.transition(actor, session_id, action, notes).await
        }

        async fn list_sessions(&self, scope: &Scope) -> Result<Vec<WorkSession>> {
            if self.reads_down.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: 503,
                    message: "backend unavailable".into(),
                }
                .into());
            }
            self.inner.list_sessions(scope).await
        }

        async fn summary(&self, scope: &Scope) -> Result<Summary> {
            self.inner.summary(scope).await
        }

        async fn accepted_applications(&self, worker_id: &str) -> Result<Vec<Application>> {
            self.inner.accepted_applications(worker_id).await
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::with_applications([Application {
            id: "a-1".into(),
            job_id: "J".into(),
            worker_id: "w-1".into(),
            employer_id: "e-1".into(),
            status: ApplicationStatus::Accepted,
            job_title: Some("Mason".into()),
            job_company: Some("Kigali Builders".into()),
        }])
    }

    #[tokio::test]
    async fn worker_and_employer_complete_a_session() {
        let mut worker = WorkTracker::new(store(), Actor::worker("w-1"));
        let session = worker.create("J", 5000).await.unwrap();
        assert_eq!(worker.view().sessions.len(), 1);
        assert_eq!(worker.view().sessions[0].next_action, None);

        // Hand the same store to the employer's page.
        let mut employer = WorkTracker::new(worker.store, Actor::employer("e-1"));
        employer.refresh().await.unwrap();
        assert_eq!(
            employer.view().session(&session.id).unwrap().next_action,
            Some(Action::ApproveStart)
        );
        employer
            .perform(Action::ApproveStart, &session.id, None)
            .await
            .unwrap();

        let mut worker = WorkTracker::new(employer.store, Actor::worker("w-1"));
        worker.perform(Action::RequestStart, &session.id, None).await.unwrap();
        worker
            .perform(Action::RequestEnd, &session.id, Some("done".into()))
            .await
            .unwrap();

        let mut employer = WorkTracker::new(worker.store, Actor::employer("e-1"));
        let done = employer
            .perform(Action::ApproveEnd, &session.id, None)
            .await
            .unwrap();
        assert_eq!(done.phase(), Phase::Completed);

        let summary = employer.view().summary.clone().unwrap();
        assert_eq!(summary.approved_sessions, 1);
        assert_eq!(summary.total_earnings, 5000);
        assert!(!employer.view().is_busy());
    }

    #[tokio::test]
    async fn conflict_reloads_and_reports_error() {
        let mut worker = WorkTracker::new(store(), Actor::worker("w-1"));
        let session = worker.create("J", 5000).await.unwrap();

        let err = worker
            .perform(Action::RequestStart, &session.id, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkTrackError::Lifecycle(LifecycleError::ApprovalPending)
        ));
        let view = worker.view();
        assert!(!view.is_busy());
        assert_eq!(
            view.last_error.as_deref(),
            Some("cannot start work until the employer approves the session")
        );
        assert_eq!(view.sessions[0].phase, Phase::PendingStartApproval);
    }

    #[tokio::test]
    async fn accepted_jobs_lists_worker_applications() {
        let worker = WorkTracker::new(store(), Actor::worker("w-1"));
        let jobs = worker.accepted_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_title.as_deref(), Some("Mason"));
    }

    #[tokio::test]
    async fn refresh_after_leaving_repopulates_the_page() {
        let mut worker = WorkTracker::new(store(), Actor::worker("w-1"));
        worker.create("J", 5000).await.unwrap();
        worker.leave();
        assert!(!worker.view().is_busy());

        let view = worker.refresh().await.unwrap();
        assert_eq!(view.sessions.len(), 1);
        assert_eq!(view.summary.as_ref().unwrap().pending_start_approval, 1);
    }

    #[tokio::test]
    async fn committed_action_succeeds_when_reload_fails() {
        let store = FlakyReads {
            inner: store(),
            reads_down: AtomicBool::new(false),
        };
        let session = store
            .create_session(&Actor::worker("w-1"), &NewSession {
                job_id: "J".into(),
                daily_payment: 5000,
            })
            .await
            .unwrap();

        let mut employer = WorkTracker::new(store, Actor::employer("e-1"));
        employer.refresh().await.unwrap();
        employer.store().reads_down.store(true, Ordering::SeqCst);

        let approved = employer
            .perform(Action::ApproveStart, &session.id, None)
            .await
            .unwrap();
        assert_eq!(approved.phase(), Phase::ReadyToStart);
        assert!(!employer.view().is_busy());
        assert!(employer.view().last_error.is_none());

        employer.store().reads_down.store(false, Ordering::SeqCst);
        let listed = employer
            .store()
            .list_sessions(&employer.scope())
            .await
            .unwrap();
        assert_eq!(listed[0].phase(), Phase::ReadyToStart);
    }

    #[tokio::test]
    async fn scope_follows_role() {
        let tracker = WorkTracker::new(MemoryStore::new(), Actor::employer("e-7"));
        assert_eq!(tracker.scope(), Scope::Employer("e-7".into()));
    }
}
