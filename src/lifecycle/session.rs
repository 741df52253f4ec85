use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::phase::{ApprovalFlags, Phase};

pub type SessionId = String;
pub type JobId = String;
pub type UserId = String;

/// Which half of the approval handshake a party holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Employer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Employer => "employer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller issuing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn worker(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            role: Role::Worker,
        }
    }

    pub fn employer(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            role: Role::Employer,
        }
    }
}

/// Start and end of the work actually performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub hours_worked: f64,
}

impl Shift {
    pub fn new(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at,
            hours_worked: hours_between(started_at, ended_at),
        }
    }
}

/// Elapsed hours between two instants, rounded to two decimals.
/// A clock that went backwards yields zero.
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let seconds = (end - start).num_seconds().max(0) as f64;
    (seconds / 36.0).round() / 100.0
}

/// Where a session stands in the handshake.
///
/// Each variant carries exactly the data that exists at that point, so a
/// session that "ended" without ever starting cannot be constructed. The four
/// approval flags are derived from this, never stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    PendingStartApproval,
    ReadyToStart,
    InProgress { started_at: DateTime<Utc> },
    PendingEndApproval { shift: Shift },
    Completed { shift: Shift },
}

impl Stage {
    pub fn flags(&self) -> ApprovalFlags {
        let (start_approved, work_started, work_ended, end_approved) = match self {
            Stage::PendingStartApproval => (false, false, false, false),
            Stage::ReadyToStart => (true, false, false, false),
            Stage::InProgress { .. } => (true, true, false, false),
            Stage::PendingEndApproval { .. } => (true, true, true, false),
            Stage::Completed { .. } => (true, true, true, true),
        };
        ApprovalFlags {
            start_approved,
            work_started,
            work_ended,
            end_approved,
        }
    }

    pub fn shift(&self) -> Option<&Shift> {
        match self {
            Stage::PendingEndApproval { shift } | Stage::Completed { shift } => Some(shift),
            _ => None,
        }
    }
}

/// One engagement between a worker and an employer for a specific job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: SessionId,
    pub job_id: JobId,
    pub worker_id: UserId,
    pub employer_id: UserId,
    /// Fixed at creation, in RWF.
    pub daily_payment: u64,
    pub stage: Stage,
    pub worker_notes: Option<String>,
    pub employer_start_notes: Option<String>,
    pub employer_end_notes: Option<String>,
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkSession {
    pub fn new(
        job_id: JobId,
        worker_id: UserId,
        employer_id: UserId,
        daily_payment: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_id,
            worker_id,
            employer_id,
            daily_payment,
            stage: Stage::PendingStartApproval,
            worker_notes: None,
            employer_start_notes: None,
            employer_end_notes: None,
            job_title: None,
            employer_name: None,
            created_at,
        }
    }

    pub fn flags(&self) -> ApprovalFlags {
        self.stage.flags()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_flags(self.flags())
    }

    pub fn start_approved(&self) -> bool {
        self.flags().start_approved
    }

    pub fn work_started(&self) -> bool {
        self.flags().work_started
    }

    pub fn work_ended(&self) -> bool {
        self.flags().work_ended
    }

    pub fn end_approved(&self) -> bool {
        self.flags().end_approved
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match &self.stage {
            Stage::InProgress { started_at } => Some(*started_at),
            stage => stage.shift().map(|s| s.started_at),
        }
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.stage.shift().map(|s| s.ended_at)
    }

    pub fn hours_worked(&self) -> Option<f64> {
        self.stage.shift().map(|s| s.hours_worked)
    }

    /// Anything short of `Completed` still blocks a second session for the job.
    pub fn is_open(&self) -> bool {
        self.phase() != Phase::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

/// A worker's application to a job, owned by the applications service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: JobId,
    pub worker_id: UserId,
    pub employer_id: UserId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_company: Option<String>,
}
