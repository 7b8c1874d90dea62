/// Access Control
///
/// Maps a signed credential to a typed Principal and enforces
/// participant-only access to sessions, conversations and appointments.
/// Authorization checks are pure; the only side effect here is the cached
/// directory lookup during authentication.
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    configs::RedisCache,
    modules::account::{
        repository::{AccountRepository, AppointmentRepository},
        repository_pg::{AccountRepositoryPg, AppointmentRepositoryPg},
        schema::{AccountStatus, AppointmentParticipants, Principal, Role},
    },
    utils::{Claims, TypeClaims},
    ENV,
};

/// Directory lookups are cached briefly so every request does not hit the
/// accounts tables. Suspension takes effect within this window.
const ACCOUNT_STATUS_TTL: usize = 60;

pub type AccessSvc = AccessService<AccountRepositoryPg, AppointmentRepositoryPg>;

#[derive(Clone)]
pub struct AccessService<A, P>
where
    A: AccountRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    account_repo: Arc<A>,
    appointment_repo: Arc<P>,
    cache: Arc<RedisCache>,
}

impl<A, P> AccessService<A, P>
where
    A: AccountRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    pub fn with_dependencies(
        account_repo: Arc<A>,
        appointment_repo: Arc<P>,
        cache: Arc<RedisCache>,
    ) -> Self {
        AccessService { account_repo, appointment_repo, cache }
    }

    /// Verify a credential and resolve the account behind it.
    ///
    /// Fails with Unauthorized when the signature or expiry check fails,
    /// Forbidden when the account no longer exists or a doctor account has
    /// been administratively suspended.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, error::SystemError> {
        let claims = Claims::decode(token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        if claims._type.as_ref() != Some(&TypeClaims::AccessToken) {
            return Err(error::SystemError::unauthorized("Only access tokens are accepted"));
        }

        let status = self.cached_status(&claims.sub, &claims.role).await?.ok_or_else(|| {
            error::SystemError::forbidden(match claims.role {
                Role::Doctor => "Doctor not found",
                Role::Patient => "Patient not found",
            })
        })?;

        if status.suspended {
            return Err(error::SystemError::forbidden("Account suspended"));
        }

        Ok(Principal { id: claims.sub, role: claims.role })
    }

    async fn cached_status(
        &self,
        id: &Uuid,
        role: &Role,
    ) -> Result<Option<AccountStatus>, error::SystemError> {
        let key = format!("account_status:{:?}:{}", role, id);

        if let Some(cached) = self.cache.get::<AccountStatus>(&key).await? {
            return Ok(Some(cached));
        }

        let status = self.account_repo.find_status(id, role).await?;
        if let Some(status) = &status {
            self.cache.set(&key, status, ACCOUNT_STATUS_TTL).await?;
        }
        Ok(status)
    }

    /// Resolve an appointment's parties and require the principal to be one
    /// of them. Returns the registry record so callers can address the
    /// other side without a second lookup.
    pub async fn authorize_appointment(
        &self,
        principal: &Principal,
        appointment_id: &Uuid,
    ) -> Result<AppointmentParticipants, error::SystemError> {
        let participants = self
            .appointment_repo
            .find_participants(appointment_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Appointment not found"))?;

        authorize_participant(principal, &participants.patient_id, &participants.doctor_id)?;

        Ok(participants)
    }
}

/// A principal is a participant iff its (id, role) pair matches either the
/// patient or the doctor side of the target. No other relation grants
/// access.
pub fn authorize_participant(
    principal: &Principal,
    patient_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Role, error::SystemError> {
    match principal.role {
        Role::Patient if principal.id == *patient_id => Ok(Role::Patient),
        Role::Doctor if principal.id == *doctor_id => Ok(Role::Doctor),
        _ => Err(error::SystemError::forbidden("Access denied")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_check_accepts_both_sides() {
        let patient_id = Uuid::now_v7();
        let doctor_id = Uuid::now_v7();

        let patient = Principal { id: patient_id, role: Role::Patient };
        let doctor = Principal { id: doctor_id, role: Role::Doctor };

        assert_eq!(
            authorize_participant(&patient, &patient_id, &doctor_id).unwrap(),
            Role::Patient
        );
        assert_eq!(authorize_participant(&doctor, &patient_id, &doctor_id).unwrap(), Role::Doctor);
    }

    #[test]
    fn participant_check_rejects_any_other_doctor() {
        let patient_id = Uuid::now_v7();
        let doctor_id = Uuid::now_v7();

        let other_doctor = Principal { id: Uuid::now_v7(), role: Role::Doctor };
        assert!(authorize_participant(&other_doctor, &patient_id, &doctor_id).is_err());
    }

    #[test]
    fn participant_check_rejects_role_mismatch() {
        let patient_id = Uuid::now_v7();
        let doctor_id = Uuid::now_v7();

        // Right id, wrong role.
        let impostor = Principal { id: patient_id, role: Role::Doctor };
        assert!(authorize_participant(&impostor, &patient_id, &doctor_id).is_err());
    }
}
