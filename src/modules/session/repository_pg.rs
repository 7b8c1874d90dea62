use uuid::Uuid;

use crate::{
    api::error,
    modules::session::{model::NewSession, repository::SessionRepository, schema::SessionEntity},
    utils::with_retry,
};

#[derive(Clone)]
pub struct SessionRepositoryPg {
    pool: sqlx::PgPool,
}

impl SessionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionRepository for SessionRepositoryPg {
    async fn insert(&self, session: &NewSession) -> Result<SessionEntity, error::SystemError> {
        // The partial unique index on (doctor_id, patient_id) over
        // non-terminal statuses rejects a duplicate pair here, not in a
        // separate pre-check that could race.
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            INSERT INTO consult_sessions
                (doctor_id, patient_id, room_id, fee, duration_estimate_minutes, payment_reference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(session.doctor_id)
        .bind(session.patient_id)
        .bind(&session.room_id)
        .bind(session.fee)
        .bind(session.duration_estimate_minutes)
        .bind(&session.payment_reference)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, SessionEntity>("SELECT * FROM consult_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
        })
        .await
    }

    async fn find_by_room(
        &self,
        room_id: &str,
    ) -> Result<Option<SessionEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, SessionEntity>("SELECT * FROM consult_sessions WHERE room_id = $1")
                .bind(room_id)
                .fetch_optional(&self.pool)
        })
        .await
    }

    async fn expire_if_stale(
        &self,
        id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<SessionEntity>, error::SystemError> {
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE consult_sessions SET status = 'expired'
            WHERE id = $1 AND status = 'pending_doctor_accept' AND created_at < $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn accept(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError> {
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE consult_sessions SET status = 'accepted', accepted_at = now()
            WHERE id = $1 AND status = 'pending_doctor_accept'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn reject(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError> {
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE consult_sessions SET status = 'rejected', refund_requested = TRUE
            WHERE id = $1 AND status = 'pending_doctor_accept'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn activate(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError> {
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE consult_sessions SET status = 'active', started_at = now()
            WHERE id = $1 AND status = 'accepted'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn complete(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError> {
        let session = sqlx::query_as::<_, SessionEntity>(
            r#"
            UPDATE consult_sessions SET status = 'completed', completed_at = now()
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn expire_stale_for_doctor(
        &self,
        doctor_id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            UPDATE consult_sessions SET status = 'expired'
            WHERE doctor_id = $1 AND status = 'pending_doctor_accept' AND created_at < $2
            "#,
        )
        .bind(doctor_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn expire_stale_for_patient(
        &self,
        patient_id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            UPDATE consult_sessions SET status = 'expired'
            WHERE patient_id = $1 AND status = 'pending_doctor_accept' AND created_at < $2
            "#,
        )
        .bind(patient_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_patient(
        &self,
        patient_id: &Uuid,
    ) -> Result<Vec<SessionEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, SessionEntity>(
                "SELECT * FROM consult_sessions WHERE patient_id = $1 ORDER BY created_at DESC",
            )
            .bind(patient_id)
            .fetch_all(&self.pool)
        })
        .await
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &Uuid,
    ) -> Result<Vec<SessionEntity>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, SessionEntity>(
                "SELECT * FROM consult_sessions WHERE doctor_id = $1 ORDER BY created_at DESC",
            )
            .bind(doctor_id)
            .fetch_all(&self.pool)
        })
        .await
    }
}
