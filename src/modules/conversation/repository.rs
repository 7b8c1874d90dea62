use uuid::Uuid;

use crate::{
    api::error,
    modules::{account::schema::Role, conversation::schema::ConversationEntity},
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres>;

    async fn find_by_appointment(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Insert-if-absent, then lock the row for the remainder of the
    /// transaction. Holding the row lock is what serializes concurrent
    /// sends into a single per-conversation append order.
    async fn lock_or_create<'e>(
        &self,
        appointment_id: &Uuid,
        patient_id: &Uuid,
        doctor_id: &Uuid,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<ConversationEntity, error::SystemError>;

    /// Stamp the latest-message summary and bump the receiver's unread
    /// counter as one guarded increment.
    async fn record_message<'e>(
        &self,
        conversation_id: &Uuid,
        summary: &str,
        sent_at: chrono::DateTime<chrono::Utc>,
        receiver_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<(), error::SystemError>;

    async fn reset_unread<'e>(
        &self,
        conversation_id: &Uuid,
        reader_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<(), error::SystemError>;

    async fn list_for(
        &self,
        principal_id: &Uuid,
        role: &Role,
    ) -> Result<Vec<ConversationEntity>, error::SystemError>;
}
