use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::account::schema::Role;
use crate::modules::session::schema::{RespondAction, SessionEntity};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub room_id: String,
    pub fee: i64,
    pub duration_estimate_minutes: i32,
    pub payment_reference: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub doctor_id: Uuid,
    #[validate(range(min = 0))]
    pub fee: i64,
    #[validate(length(min = 1))]
    pub payment_reference: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub session_id: Uuid,
    pub action: RespondAction,
}

/// Returned by the room-access gate; the external video widget keys off
/// `can_join` and `user_role`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAccess {
    pub can_join: bool,
    pub user_role: Role,
    pub session: SessionEntity,
}
