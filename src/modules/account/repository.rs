use uuid::Uuid;

use crate::{
    api::error,
    modules::account::schema::{AccountStatus, AppointmentParticipants, DoctorAvailability, Role},
};

use super::schema::AvailabilityUpdate;

/// Read-side of the external account directory. Accounts themselves are
/// managed elsewhere; the core only resolves existence, suspension and
/// the doctor's consult-availability flags.
#[async_trait::async_trait]
pub trait AccountRepository {
    async fn find_status(
        &self,
        id: &Uuid,
        role: &Role,
    ) -> Result<Option<AccountStatus>, error::SystemError>;

    async fn find_doctor_availability(
        &self,
        id: &Uuid,
    ) -> Result<Option<DoctorAvailability>, error::SystemError>;

    async fn update_doctor_availability(
        &self,
        id: &Uuid,
        update: &AvailabilityUpdate,
    ) -> Result<Option<DoctorAvailability>, error::SystemError>;
}

/// Read-side of the appointment registry collaborator.
#[async_trait::async_trait]
pub trait AppointmentRepository {
    async fn find_participants(
        &self,
        appointment_id: &Uuid,
    ) -> Result<Option<AppointmentParticipants>, error::SystemError>;
}
