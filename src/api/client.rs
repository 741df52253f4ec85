use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::ApiError;
use super::types::{ApplicationRecord, CreateSessionRequest, ErrorBody, NotesRequest, SessionRecord};
use crate::config::WorkTrackConfig;
use crate::error::{Result, WorkTrackError};
use crate::lifecycle::{Action, Actor, Application, LifecycleError, WorkSession};
use crate::store::{NewSession, SessionStore};
use crate::summary::{Scope, Summary};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Session store backed by the remote REST API.
///
/// The backend identifies the caller from the bearer token, so the `actor`
/// passed to each call is only used for logging and local validation.
pub struct HttpStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::with_timeouts(
            base_url,
            token,
            Duration::from_secs(10),
            Duration::from_secs(30),
        )
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        token: Option<String>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &WorkTrackConfig) -> Result<Self> {
        Self::with_timeouts(
            config.api_url.clone(),
            Some(config.api_token.clone()),
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the body, translating rejections of a
    /// lifecycle action into [`LifecycleError`]s.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        rejection: Rejection<'_>,
    ) -> Result<T> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend responded");

        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = ErrorBody::message(&raw);
            warn!(status = status.as_u16(), %message, "Backend rejected request");
            return Err(rejection.into_error(status, message));
        }

        Ok(response.json::<T>().await.map_err(ApiError::from)?)
    }

    async fn send_session(
        &self,
        builder: RequestBuilder,
        rejection: Rejection<'_>,
    ) -> Result<WorkSession> {
        let record: SessionRecord = self.send(builder, rejection).await?;
        Ok(WorkSession::try_from(record)?)
    }
}

/// What the request was trying to do, for mapping a non-2xx status.
#[derive(Debug, Clone, Copy)]
enum Rejection<'a> {
    Create { job_id: &'a str },
    Transition { action: Action, session_id: &'a str },
    Read,
}

impl Rejection<'_> {
    fn into_error(self, status: StatusCode, message: String) -> WorkTrackError {
        let lifecycle = match (self, status.as_u16()) {
            (Rejection::Create { .. }, 401 | 403) => Some(LifecycleError::Unauthorized {
                action: Action::Create,
                expected: Action::Create.role().as_str(),
            }),
            (Rejection::Transition { action, .. }, 401 | 403) => {
                Some(LifecycleError::Unauthorized {
                    action,
                    expected: action.role().as_str(),
                })
            }
            (Rejection::Create { job_id }, 404 | 400 | 422) => {
                Some(LifecycleError::InvalidApplication {
                    job_id: job_id.to_string(),
                })
            }
            (Rejection::Create { job_id }, 409) => Some(LifecycleError::DuplicateSession {
                job_id: job_id.to_string(),
                session_id: None,
            }),
            (Rejection::Transition { session_id, .. }, 404) => {
                Some(LifecycleError::NotFound(session_id.to_string()))
            }
            (
                Rejection::Transition {
                    action: Action::RequestStart,
                    ..
                },
                400,
            ) => Some(LifecycleError::ApprovalPending),
            (Rejection::Transition { action, .. }, 400 | 409) => {
                Some(LifecycleError::InvalidTransition {
                    action,
                    phase: None,
                })
            }
            _ => None,
        };

        match lifecycle {
            Some(err) => err.into(),
            None => ApiError::Status {
                status: status.as_u16(),
                message,
            }
            .into(),
        }
    }
}

fn scoped_path(scope: &Scope, worker: &'static str, employer: &'static str) -> &'static str {
    match scope {
        Scope::Worker(_) => worker,
        Scope::Employer(_) => employer,
    }
}

impl SessionStore for HttpStore {
    async fn create_session(&self, actor: &Actor, request: &NewSession) -> Result<WorkSession> {
        if request.daily_payment == 0 {
            return Err(LifecycleError::InvalidPayment.into());
        }
        debug!(worker = %actor.id, job_id = %request.job_id, "Creating work session");
        let body = CreateSessionRequest {
            job_id: request.job_id.clone(),
            daily_payment: request.daily_payment,
        };
        let builder = self.request(Method::POST, "work-sessions").json(&body);
        self.send_session(
            builder,
            Rejection::Create {
                job_id: &request.job_id,
            },
        )
        .await
    }

    async fn transition(
        &self,
        actor: &Actor,
        session_id: &str,
        action: Action,
        notes: Option<String>,
    ) -> Result<WorkSession> {
        if action == Action::Create {
            return Err(LifecycleError::InvalidTransition {
                action,
                phase: None,
            }
            .into());
        }
        debug!(actor = %actor.id, session_id, %action, "Requesting transition");
        let path = format!("work-sessions/{session_id}/{}", action.path_segment());
        let builder = self
            .request(Method::POST, &path)
            .json(&NotesRequest { notes });
        self.send_session(builder, Rejection::Transition { action, session_id })
            .await
    }

    async fn list_sessions(&self, scope: &Scope) -> Result<Vec<WorkSession>> {
        let path = scoped_path(scope, "work-sessions/my-sessions", "work-sessions/employer/sessions");
        let records: Vec<SessionRecord> = self
            .send(self.request(Method::GET, path), Rejection::Read)
            .await?;
        records
            .into_iter()
            .map(|r| WorkSession::try_from(r).map_err(WorkTrackError::from))
            .collect()
    }

    async fn summary(&self, scope: &Scope) -> Result<Summary> {
        let path = scoped_path(scope, "work-sessions/summary", "work-sessions/employer/summary");
        self.send(self.request(Method::GET, path), Rejection::Read)
            .await
    }

    async fn accepted_applications(&self, worker_id: &str) -> Result<Vec<Application>> {
        let builder = self
            .request(Method::GET, "applications/my-applications")
            .query(&[("status", "accepted")]);
        let records: Vec<ApplicationRecord> = self.send(builder, Rejection::Read).await?;
        Ok(records
            .into_iter()
            .map(Application::from)
            .map(|mut app| {
                // The backend scopes by token and may omit the worker id.
                if app.worker_id.is_empty() {
                    app.worker_id = worker_id.to_string();
                }
                app
            })
            .collect())
    }
}
