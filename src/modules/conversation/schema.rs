#![allow(dead_code)]
use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One persistent chat thread per appointment, created lazily on the
/// first message and never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntity {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub last_message_summary: String,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub unread_patient_count: i32,
    pub unread_doctor_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationEntity {
    pub fn unread_for(&self, role: &crate::modules::account::schema::Role) -> i32 {
        match role {
            crate::modules::account::schema::Role::Patient => self.unread_patient_count,
            crate::modules::account::schema::Role::Doctor => self.unread_doctor_count,
        }
    }
}
