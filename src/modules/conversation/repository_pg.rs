use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        account::schema::Role,
        conversation::{repository::ConversationRepository, schema::ConversationEntity},
    },
    utils::with_retry,
};

#[derive(Clone)]
pub struct ConversationRepositoryPg {
    pool: sqlx::PgPool,
}

impl ConversationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationRepositoryPg {
    fn get_pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    async fn find_by_appointment(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, ConversationEntity>(
                "SELECT * FROM conversations WHERE appointment_id = $1",
            )
            .bind(appointment_id)
            .fetch_optional(&self.pool)
        })
        .await
    }

    async fn lock_or_create<'e>(
        &self,
        appointment_id: &Uuid,
        patient_id: &Uuid,
        doctor_id: &Uuid,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<ConversationEntity, error::SystemError> {
        // ON CONFLICT DO NOTHING keeps lazy creation race-free under the
        // unique appointment_id constraint; the FOR UPDATE read then locks
        // whichever row won.
        sqlx::query(
            r#"
            INSERT INTO conversations (appointment_id, patient_id, doctor_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (appointment_id) DO NOTHING
            "#,
        )
        .bind(appointment_id)
        .bind(patient_id)
        .bind(doctor_id)
        .execute(tx.as_mut())
        .await?;

        let conversation = sqlx::query_as::<_, ConversationEntity>(
            "SELECT * FROM conversations WHERE appointment_id = $1 FOR UPDATE",
        )
        .bind(appointment_id)
        .fetch_one(tx.as_mut())
        .await?;

        Ok(conversation)
    }

    async fn record_message<'e>(
        &self,
        conversation_id: &Uuid,
        summary: &str,
        sent_at: chrono::DateTime<chrono::Utc>,
        receiver_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<(), error::SystemError> {
        let query = match receiver_role {
            Role::Patient => {
                r#"
                UPDATE conversations SET
                    last_message_summary = $2,
                    last_message_at = $3,
                    unread_patient_count = unread_patient_count + 1,
                    updated_at = now()
                WHERE id = $1
                "#
            }
            Role::Doctor => {
                r#"
                UPDATE conversations SET
                    last_message_summary = $2,
                    last_message_at = $3,
                    unread_doctor_count = unread_doctor_count + 1,
                    updated_at = now()
                WHERE id = $1
                "#
            }
        };

        sqlx::query(query)
            .bind(conversation_id)
            .bind(summary)
            .bind(sent_at)
            .execute(tx.as_mut())
            .await?;

        Ok(())
    }

    async fn reset_unread<'e>(
        &self,
        conversation_id: &Uuid,
        reader_role: &Role,
        tx: &mut sqlx::Transaction<'e, sqlx::Postgres>,
    ) -> Result<(), error::SystemError> {
        let query = match reader_role {
            Role::Patient => {
                "UPDATE conversations SET unread_patient_count = 0, updated_at = now() WHERE id = $1"
            }
            Role::Doctor => {
                "UPDATE conversations SET unread_doctor_count = 0, updated_at = now() WHERE id = $1"
            }
        };

        sqlx::query(query).bind(conversation_id).execute(tx.as_mut()).await?;

        Ok(())
    }

    async fn list_for(
        &self,
        principal_id: &Uuid,
        role: &Role,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        let query = match role {
            Role::Patient => {
                "SELECT * FROM conversations WHERE patient_id = $1 ORDER BY last_message_at DESC"
            }
            Role::Doctor => {
                "SELECT * FROM conversations WHERE doctor_id = $1 ORDER BY last_message_at DESC"
            }
        };

        with_retry(|| {
            sqlx::query_as::<_, ConversationEntity>(query).bind(principal_id).fetch_all(&self.pool)
        })
        .await
    }
}
