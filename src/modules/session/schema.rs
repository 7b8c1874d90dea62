#![allow(dead_code)]
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Consultation lifecycle. `rejected`, `completed` and `expired` are
/// terminal; a (doctor, patient) pair can hold at most one non-terminal
/// session at a time (enforced by a partial unique index).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    PendingDoctorAccept,
    Accepted,
    Rejected,
    Active,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Rejected | SessionStatus::Completed | SessionStatus::Expired)
    }

    /// The video room is only enterable while the consult is accepted or
    /// already running.
    pub fn is_joinable(&self) -> bool {
        matches!(self, SessionStatus::Accepted | SessionStatus::Active)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RespondAction {
    Accept,
    Reject,
}

/// An unanswered request expires once the doctor has had more than the
/// configured window to respond. Evaluated on access with the caller's
/// clock; there is no background sweep.
pub fn is_expired(
    created_at: chrono::DateTime<chrono::Utc>,
    now: chrono::DateTime<chrono::Utc>,
    timeout_minutes: i64,
) -> bool {
    now - created_at > chrono::Duration::minutes(timeout_minutes)
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntity {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub room_id: String,
    pub fee: i64,
    pub duration_estimate_minutes: i32,
    pub status: SessionStatus,
    pub payment_reference: Option<String>,
    pub refund_requested: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub accepted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn terminal_states() {
        assert!(SessionStatus::Rejected.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Expired.is_terminal());
        assert!(!SessionStatus::PendingDoctorAccept.is_terminal());
        assert!(!SessionStatus::Accepted.is_terminal());
        assert!(!SessionStatus::Active.is_terminal());
    }

    #[test]
    fn joinable_states() {
        assert!(SessionStatus::Accepted.is_joinable());
        assert!(SessionStatus::Active.is_joinable());
        assert!(!SessionStatus::PendingDoctorAccept.is_joinable());
        assert!(!SessionStatus::Expired.is_joinable());
    }

    #[test]
    fn request_is_live_within_the_window() {
        let created = Utc::now();
        assert!(!is_expired(created, created + Duration::minutes(5), 30));
        assert!(!is_expired(created, created + Duration::minutes(30), 30));
    }

    #[test]
    fn request_expires_past_the_window() {
        let created = Utc::now();
        assert!(is_expired(created, created + Duration::minutes(31), 30));
        assert!(is_expired(created, created + Duration::hours(6), 30));
    }

    #[test]
    fn status_wire_format_is_snake_case() {
        let json = serde_json::to_string(&SessionStatus::PendingDoctorAccept).unwrap();
        assert_eq!(json, r#""pending_doctor_accept""#);
        let back: SessionStatus = serde_json::from_str(r#""expired""#).unwrap();
        assert_eq!(back, SessionStatus::Expired);
    }

    #[test]
    fn respond_action_wire_format() {
        assert_eq!(serde_json::to_string(&RespondAction::Accept).unwrap(), r#""accept""#);
        let back: RespondAction = serde_json::from_str(r#""reject""#).unwrap();
        assert_eq!(back, RespondAction::Reject);
    }
}
