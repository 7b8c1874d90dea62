use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        account::schema::Role,
        message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
    },
    utils::with_retry,
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn insert<'e>(
        &self,
        message: &InsertMessage,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<MessageEntity, error::SystemError> {
        // clock_timestamp() instead of now(): now() is fixed at
        // transaction start, but the append order is decided by who takes
        // the conversation row lock first, which can differ.
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages
                (conversation_id, appointment_id, sender_id, sender_role, receiver_id,
                 receiver_role, body, kind, attachment_url, attachment_name, attachment_size,
                 created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, clock_timestamp())
            RETURNING *
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.appointment_id)
        .bind(message.sender_id)
        .bind(message.sender_role)
        .bind(message.receiver_id)
        .bind(message.receiver_role)
        .bind(&message.body)
        .bind(message.kind)
        .bind(message.attachment.as_ref().map(|a| a.url.clone()))
        .bind(message.attachment.as_ref().map(|a| a.name.clone()))
        .bind(message.attachment.as_ref().map(|a| a.size))
        .fetch_one(tx.as_mut())
        .await?;

        Ok(message)
    }

    async fn list_by_conversation(
        &self,
        conversation_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, MessageEntity>(
                "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC LIMIT $2",
            )
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(&self.pool)
        })
        .await
    }

    async fn mark_read<'e>(
        &self,
        conversation_id: &Uuid,
        reader_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET is_read = TRUE, read_at = now()
            WHERE conversation_id = $1 AND receiver_role = $2 AND is_read = FALSE
            "#,
        )
        .bind(conversation_id)
        .bind(reader_role)
        .execute(tx.as_mut())
        .await?;

        Ok(result.rows_affected())
    }
}
