use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        account::schema::Role,
        message::{model::InsertMessage, schema::MessageEntity},
    },
};

#[async_trait::async_trait]
pub trait MessageRepository {
    /// Append under the conversation row lock held by the surrounding
    /// transaction; the insert timestamp is taken after lock acquisition
    /// so concurrent senders cannot interleave out of order.
    async fn insert<'e>(
        &self,
        message: &InsertMessage,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<MessageEntity, error::SystemError>;

    async fn list_by_conversation(
        &self,
        conversation_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Stamp read state on every unread message addressed to the reader.
    /// Returns the number of rows touched; zero makes mark-read a no-op.
    async fn mark_read<'e>(
        &self,
        conversation_id: &Uuid,
        reader_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<u64, error::SystemError>;
}
