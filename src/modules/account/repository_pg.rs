use uuid::Uuid;

use crate::{
    api::error,
    modules::account::{
        repository::{AccountRepository, AppointmentRepository},
        schema::{
            AccountStatus, AppointmentParticipants, AvailabilityUpdate, DoctorAvailability, Role,
        },
    },
    utils::with_retry,
};

#[derive(Clone)]
pub struct AccountRepositoryPg {
    pool: sqlx::PgPool,
}

impl AccountRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountRepository for AccountRepositoryPg {
    async fn find_status(
        &self,
        id: &Uuid,
        role: &Role,
    ) -> Result<Option<AccountStatus>, error::SystemError> {
        let query = match role {
            Role::Patient => "SELECT display_name, suspended FROM patients WHERE id = $1",
            Role::Doctor => "SELECT display_name, suspended FROM doctors WHERE id = $1",
        };

        with_retry(|| {
            sqlx::query_as::<_, AccountStatus>(query).bind(id).fetch_optional(&self.pool)
        })
        .await
    }

    async fn find_doctor_availability(
        &self,
        id: &Uuid,
    ) -> Result<Option<DoctorAvailability>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, DoctorAvailability>(
                "SELECT online_consult_enabled, is_online_now, online_consult_fee, average_consult_duration FROM doctors WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
        })
        .await
    }

    async fn update_doctor_availability(
        &self,
        id: &Uuid,
        update: &AvailabilityUpdate,
    ) -> Result<Option<DoctorAvailability>, error::SystemError> {
        let availability = sqlx::query_as::<_, DoctorAvailability>(
            r#"
            UPDATE doctors SET
                online_consult_enabled = COALESCE($2, online_consult_enabled),
                is_online_now = COALESCE($3, is_online_now),
                online_consult_fee = COALESCE($4, online_consult_fee)
            WHERE id = $1
            RETURNING online_consult_enabled, is_online_now, online_consult_fee, average_consult_duration
            "#,
        )
        .bind(id)
        .bind(update.online_consult_enabled)
        .bind(update.is_online_now)
        .bind(update.online_consult_fee)
        .fetch_optional(&self.pool)
        .await?;

        Ok(availability)
    }
}

#[derive(Clone)]
pub struct AppointmentRepositoryPg {
    pool: sqlx::PgPool,
}

impl AppointmentRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AppointmentRepository for AppointmentRepositoryPg {
    async fn find_participants(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<AppointmentParticipants>, error::SystemError> {
        with_retry(|| {
            sqlx::query_as::<_, AppointmentParticipants>(
                "SELECT patient_id, doctor_id FROM appointments WHERE id = $1",
            )
            .bind(appointment_id)
            .fetch_optional(&self.pool)
        })
        .await
    }
}
