use uuid::Uuid;

use crate::{
    api::error,
    modules::session::{model::NewSession, schema::SessionEntity},
};

/// Storage for consult sessions. Every status transition is a
/// compare-and-swap on the current status: the UPDATE carries the expected
/// status in its WHERE clause and returns `None` when the row has already
/// moved on, so concurrent responders cannot double-transition.
#[async_trait::async_trait]
pub trait SessionRepository {
    async fn insert(&self, session: &NewSession) -> Result<SessionEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError>;

    async fn find_by_room(
        &self,
        room_id: &str,
    ) -> Result<Option<SessionEntity>, error::SystemError>;

    /// pending_doctor_accept → expired, only when created before `cutoff`.
    async fn expire_if_stale(
        &self,
        id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<SessionEntity>, error::SystemError>;

    /// pending_doctor_accept → accepted, stamping accepted_at.
    async fn accept(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError>;

    /// pending_doctor_accept → rejected, raising the durable refund flag.
    async fn reject(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError>;

    /// accepted → active, stamping started_at on the first join.
    async fn activate(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError>;

    /// active → completed.
    async fn complete(&self, id: &Uuid) -> Result<Option<SessionEntity>, error::SystemError>;

    /// Bulk lazy-expiry sweep over one principal's stale pending sessions,
    /// run before listing so listings never show a nominally-pending
    /// session past its deadline.
    async fn expire_stale_for_doctor(
        &self,
        doctor_id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, error::SystemError>;

    async fn expire_stale_for_patient(
        &self,
        patient_id: &Uuid,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, error::SystemError>;

    async fn list_for_patient(
        &self,
        patient_id: &Uuid,
    ) -> Result<Vec<SessionEntity>, error::SystemError>;

    async fn list_for_doctor(
        &self,
        doctor_id: &Uuid,
    ) -> Result<Vec<SessionEntity>, error::SystemError>;
}
