//! Tipos de dados trocados com o backend REST de sessões de trabalho.
//!
//! O formato de fio carrega as quatro flags booleanas; a conversão para
//! [`WorkSession`] valida as implicações entre elas e reconstrói o
//! [`Stage`] correspondente. IDs podem chegar como número ou string JSON e
//! timestamps com ou sem fuso (sem fuso são tratados como UTC).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ApiError;
use crate::lifecycle::{
    Application, ApplicationStatus, ApprovalFlags, Phase, Shift, Stage, WorkSession,
};

/// Corpo de `POST /work-sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub job_id: String,
    pub daily_payment: u64,
}

/// Corpo das quatro rotas de transição; as notas são opcionais.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Uma sessão como o backend a reporta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(deserialize_with = "id_string", alias = "user_id")]
    pub worker_id: String,
    #[serde(deserialize_with = "id_string")]
    pub employer_id: String,
    #[serde(deserialize_with = "whole_rwf")]
    pub daily_payment: u64,
    #[serde(default)]
    pub start_approved: bool,
    #[serde(default)]
    pub work_started: bool,
    #[serde(default)]
    pub work_ended: bool,
    #[serde(default)]
    pub end_approved: bool,
    /// Notas do trabalhador; o backend usa o nome `notes`.
    #[serde(default, rename = "notes")]
    pub worker_notes: Option<String>,
    #[serde(default)]
    pub employer_start_notes: Option<String>,
    #[serde(default)]
    pub employer_end_notes: Option<String>,
    #[serde(default)]
    pub hours_worked: Option<f64>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "opt_timestamp")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub employer_name: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn flags(&self) -> ApprovalFlags {
        ApprovalFlags {
            start_approved: self.start_approved,
            work_started: self.work_started,
            work_ended: self.work_ended,
            end_approved: self.end_approved,
        }
    }

    fn require(
        &self,
        value: Option<DateTime<Utc>>,
        field: &str,
    ) -> Result<DateTime<Utc>, ApiError> {
        value.ok_or_else(|| ApiError::Malformed(format!("session {} missing {field}", self.id)))
    }
}

impl TryFrom<SessionRecord> for WorkSession {
    type Error = ApiError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let flags = record.flags();
        if !flags.is_consistent() {
            return Err(ApiError::Malformed(format!(
                "session {} has inconsistent approval flags {flags:?}",
                record.id
            )));
        }

        let stage = match Phase::from_flags(flags) {
            Phase::PendingStartApproval => Stage::PendingStartApproval,
            Phase::ReadyToStart => Stage::ReadyToStart,
            Phase::InProgress => Stage::InProgress {
                started_at: record.require(record.started_at, "started_at")?,
            },
            phase @ (Phase::PendingEndApproval | Phase::Completed) => {
                let mut shift = Shift::new(
                    record.require(record.started_at, "started_at")?,
                    record.require(record.ended_at, "ended_at")?,
                );
                // O valor do backend é o registro oficial.
                if let Some(hours) = record.hours_worked {
                    shift.hours_worked = hours;
                }
                if phase == Phase::Completed {
                    Stage::Completed { shift }
                } else {
                    Stage::PendingEndApproval { shift }
                }
            }
        };

        Ok(WorkSession {
            id: record.id,
            job_id: record.job_id,
            worker_id: record.worker_id,
            employer_id: record.employer_id,
            daily_payment: record.daily_payment,
            stage,
            worker_notes: record.worker_notes,
            employer_start_notes: record.employer_start_notes,
            employer_end_notes: record.employer_end_notes,
            job_title: record.job_title,
            employer_name: record.employer_name,
            created_at: record.created_at,
        })
    }
}

impl From<&WorkSession> for SessionRecord {
    fn from(session: &WorkSession) -> Self {
        let flags = session.flags();
        Self {
            id: session.id.clone(),
            job_id: session.job_id.clone(),
            worker_id: session.worker_id.clone(),
            employer_id: session.employer_id.clone(),
            daily_payment: session.daily_payment,
            start_approved: flags.start_approved,
            work_started: flags.work_started,
            work_ended: flags.work_ended,
            end_approved: flags.end_approved,
            worker_notes: session.worker_notes.clone(),
            employer_start_notes: session.employer_start_notes.clone(),
            employer_end_notes: session.employer_end_notes.clone(),
            hours_worked: session.hours_worked(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            job_title: session.job_title.clone(),
            employer_name: session.employer_name.clone(),
            created_at: session.created_at,
        }
    }
}

/// Uma candidatura como `GET /applications/my-applications` a devolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub job_id: String,
    #[serde(default, deserialize_with = "id_string", alias = "user_id")]
    pub worker_id: String,
    #[serde(default, deserialize_with = "id_string")]
    pub employer_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_company: Option<String>,
}

impl From<ApplicationRecord> for Application {
    fn from(record: ApplicationRecord) -> Self {
        Self {
            id: record.id,
            job_id: record.job_id,
            worker_id: record.worker_id,
            employer_id: record.employer_id,
            status: record.status,
            job_title: record.job_title,
            job_company: record.job_company,
        }
    }
}

/// Corpo de erro no formato `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Extrai uma mensagem legível do corpo da resposta, caindo para o texto cru.
    pub fn message(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(s),
            }) => s,
            Ok(body) => body.detail.to_string(),
            Err(_) if raw.trim().is_empty() => "no response body".to_string(),
            Err(_) => raw.trim().to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Whole(u64),
    Decimal(f64),
    Text(String),
}

/// Valores em RWF podem chegar como inteiro, float (`5000.0`) ou string
/// decimal (`"5000.00"`); são arredondados para RWF inteiros.
fn whole_rwf<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = match RawAmount::deserialize(deserializer)? {
        RawAmount::Whole(n) => return Ok(n),
        RawAmount::Decimal(f) => f,
        RawAmount::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {raw}")))?,
    };
    let rounded = value.round();
    if rounded.is_finite() && rounded >= 0.0 && rounded < u64::MAX as f64 {
        Ok(rounded as u64)
    } else {
        Err(serde::de::Error::custom(format!("invalid amount: {value}")))
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn opt_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETED: &str = r#"{
        "id": 42,
        "job_id": 7,
        "worker_id": 3,
        "employer_id": "emp-9",
        "daily_payment": 5000,
        "start_approved": true,
        "work_started": true,
        "work_ended": true,
        "end_approved": true,
        "notes": "Finished the east wall",
        "employer_end_notes": "Paid",
        "hours_worked": 7.75,
        "started_at": "2025-02-03T08:00:00",
        "ended_at": "2025-02-03T16:00:00Z",
        "job_title": "Mason",
        "employer_name": "Kigali Builders",
        "created_at": "2025-02-03T07:30:00.123456"
    }"#;

    #[test]
    fn completed_record_converts_with_backend_hours() {
        let record: SessionRecord = serde_json::from_str(COMPLETED).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.worker_id, "3");

        let session = WorkSession::try_from(record).unwrap();
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.hours_worked(), Some(7.75));
        assert_eq!(session.worker_notes.as_deref(), Some("Finished the east wall"));
        assert_eq!(session.employer_name.as_deref(), Some("Kigali Builders"));
    }

    #[test]
    fn fresh_record_needs_no_timestamps() {
        let json = r#"{
            "id": "s-1", "job_id": "j-1", "user_id": "w-1", "employer_id": "e-1",
            "daily_payment": 3000, "created_at": "2025-02-03T07:30:00Z"
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        let session = WorkSession::try_from(record).unwrap();
        assert_eq!(session.phase(), Phase::PendingStartApproval);
        assert_eq!(session.worker_id, "w-1");
    }

    #[test]
    fn inconsistent_flags_are_rejected() {
        let json = r#"{
            "id": "s-1", "job_id": "j-1", "worker_id": "w-1", "employer_id": "e-1",
            "daily_payment": 3000, "work_started": true, "started_at": "2025-02-03T08:00:00Z",
            "created_at": "2025-02-03T07:30:00Z"
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        let err = WorkSession::try_from(record).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn in_progress_without_start_time_is_malformed() {
        let json = r#"{
            "id": "s-1", "job_id": "j-1", "worker_id": "w-1", "employer_id": "e-1",
            "daily_payment": 3000, "start_approved": true, "work_started": true,
            "created_at": "2025-02-03T07:30:00Z"
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        let err = WorkSession::try_from(record).unwrap_err();
        assert_eq!(err.to_string(), "malformed session record: session s-1 missing started_at");
    }

    #[test]
    fn domain_session_serializes_to_wire_flags() {
        let record: SessionRecord = serde_json::from_str(COMPLETED).unwrap();
        let session = WorkSession::try_from(record.clone()).unwrap();
        let back = SessionRecord::from(&session);
        assert_eq!(back.flags(), record.flags());
        assert_eq!(back.hours_worked, Some(7.75));

        let json = serde_json::to_value(&back).unwrap();
        assert_eq!(json["notes"], "Finished the east wall");
        assert_eq!(json["end_approved"], true);
    }

    #[test]
    fn daily_payment_accepts_float_and_decimal_string() {
        let with_payment = |payment: &str| {
            format!(
                r#"{{"id": "s-1", "job_id": "j-1", "worker_id": "w-1", "employer_id": "e-1",
                    "daily_payment": {payment}, "created_at": "2025-02-03T07:30:00Z"}}"#
            )
        };
        for (payment, expected) in [("5000", 5000), ("5000.0", 5000), (r#""5000.00""#, 5000)] {
            let record: SessionRecord = serde_json::from_str(&with_payment(payment)).unwrap();
            assert_eq!(record.daily_payment, expected, "{payment}");
        }
        for payment in ["-5", "-0.75", r#""abc""#, "1e30"] {
            assert!(
                serde_json::from_str::<SessionRecord>(&with_payment(payment)).is_err(),
                "{payment}"
            );
        }
    }

    #[test]
    fn notes_request_omits_missing_notes() {
        let json = serde_json::to_string(&NotesRequest::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn error_body_message_extraction() {
        assert_eq!(ErrorBody::message(r#"{"detail":"Session not approved"}"#), "Session not approved");
        assert_eq!(ErrorBody::message("Bad Gateway"), "Bad Gateway");
        assert_eq!(ErrorBody::message(""), "no response body");
    }

    #[test]
    fn application_record_accepts_numeric_ids() {
        let json = r#"{"id": 1, "job_id": 7, "user_id": 3, "status": "accepted", "job_title": "Mason"}"#;
        let app: Application = serde_json::from_str::<ApplicationRecord>(json).unwrap().into();
        assert_eq!(app.job_id, "7");
        assert_eq!(app.worker_id, "3");
        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert!(app.employer_id.is_empty());
    }
}
