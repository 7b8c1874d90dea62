use serde::Serialize;
use uuid::Uuid;

/// A conversation as seen by one participant: annotated with the caller's
/// own unread count rather than both counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListItem {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub last_message_summary: String,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub unread_count: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadTotals {
    pub total_unread: i64,
    pub conversations: usize,
}
