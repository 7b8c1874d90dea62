/// Session Negotiation Engine
///
/// The request → accept/reject/expire state machine for instant
/// consultations. All transitions funnel through here: each one re-checks
/// lazy expiry first, then applies a compare-and-swap update so concurrent
/// responses cannot double-transition a session.
use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        access::service::authorize_participant,
        account::{
            repository::AccountRepository,
            repository_pg::AccountRepositoryPg,
            schema::{AvailabilityUpdate, DoctorAvailability, Principal, Role},
        },
        session::{
            model::{CreateSessionRequest, NewSession, RoomAccess},
            repository::SessionRepository,
            repository_pg::SessionRepositoryPg,
            schema::{is_expired, RespondAction, SessionEntity, SessionStatus},
        },
        websocket::{events::SendToPrincipal, message::ServerMessage, server::ConsultServer},
    },
    ENV,
};

pub type SessionSvc = SessionService<SessionRepositoryPg, AccountRepositoryPg>;

#[derive(Clone)]
pub struct SessionService<S, A>
where
    S: SessionRepository + Send + Sync,
    A: AccountRepository + Send + Sync,
{
    session_repo: Arc<S>,
    account_repo: Arc<A>,
    ws_server: Arc<Addr<ConsultServer>>,
}

impl<S, A> SessionService<S, A>
where
    S: SessionRepository + Send + Sync,
    A: AccountRepository + Send + Sync,
{
    pub fn with_dependencies(
        session_repo: Arc<S>,
        account_repo: Arc<A>,
        ws_server: Arc<Addr<ConsultServer>>,
    ) -> Self {
        SessionService { session_repo, account_repo, ws_server }
    }

    fn cutoff(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now() - chrono::Duration::minutes(ENV.pending_session_timeout_minutes)
    }

    /// Apply lazy expiry to a freshly-read session. A live session passes
    /// the check; a stale pending one is flipped to expired and the call
    /// fails with a state conflict.
    async fn check_expiry(&self, session: &SessionEntity) -> Result<(), error::SystemError> {
        if session.status == SessionStatus::PendingDoctorAccept
            && is_expired(session.created_at, chrono::Utc::now(), ENV.pending_session_timeout_minutes)
        {
            // CAS: a concurrent respond may have resolved it first, in
            // which case the row is left alone and the caller still fails.
            self.session_repo.expire_if_stale(&session.id, self.cutoff()).await?;
            log::info!("Session {} expired lazily", session.id);
            return Err(error::SystemError::state_conflict("Session is no longer pending"));
        }
        Ok(())
    }

    /// Create a consultation request after the payment collaborator has
    /// confirmed payment.
    pub async fn create(
        &self,
        patient: &Principal,
        req: &CreateSessionRequest,
    ) -> Result<SessionEntity, error::SystemError> {
        if patient.role != Role::Patient {
            return Err(error::SystemError::forbidden("Only patients can request consultations"));
        }

        let availability = self
            .account_repo
            .find_doctor_availability(&req.doctor_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Doctor not found"))?;

        if !availability.online_consult_enabled || !availability.is_online_now {
            return Err(error::SystemError::state_conflict(
                "Doctor is not available for online consultation",
            ));
        }

        let session = self
            .session_repo
            .insert(&NewSession {
                doctor_id: req.doctor_id,
                patient_id: patient.id,
                room_id: format!("consult_{}", Uuid::now_v7()),
                fee: req.fee,
                duration_estimate_minutes: availability.average_consult_duration,
                payment_reference: req.payment_reference.clone(),
            })
            .await?;

        let patient_name = self
            .account_repo
            .find_status(&patient.id, &Role::Patient)
            .await?
            .map(|s| s.display_name)
            .unwrap_or_default();

        self.ws_server.do_send(SendToPrincipal {
            principal_id: session.doctor_id,
            message: ServerMessage::IncomingConsult {
                session_id: session.id,
                room_id: session.room_id.clone(),
                patient_id: session.patient_id,
                patient_name,
                fee: session.fee,
                duration_estimate_minutes: session.duration_estimate_minutes,
                created_at: session.created_at.to_rfc3339(),
            },
        });

        log::info!(
            "Consult session {} created for doctor {} by patient {}",
            session.id,
            session.doctor_id,
            session.patient_id
        );

        Ok(session)
    }

    /// Doctor accepts or rejects a pending request. Rejection raises the
    /// durable refund flag; the payment collaborator executes the refund
    /// out of band.
    pub async fn respond(
        &self,
        doctor: &Principal,
        session_id: &Uuid,
        action: RespondAction,
    ) -> Result<SessionEntity, error::SystemError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Session not found"))?;

        if doctor.role != Role::Doctor || session.doctor_id != doctor.id {
            return Err(error::SystemError::forbidden("Unauthorized"));
        }

        self.check_expiry(&session).await?;

        let updated = match action {
            RespondAction::Accept => self.session_repo.accept(session_id).await?,
            RespondAction::Reject => self.session_repo.reject(session_id).await?,
        }
        // Lost the CAS: a concurrent respond or expiry got there first.
        .ok_or_else(|| error::SystemError::state_conflict("Session is no longer pending"))?;

        self.ws_server.do_send(SendToPrincipal {
            principal_id: updated.patient_id,
            message: ServerMessage::ConsultResponse {
                session_id: updated.id,
                room_id: updated.room_id.clone(),
                action,
                status: updated.status,
            },
        });

        log::info!("Session {} {:?}ed by doctor {}", updated.id, action, doctor.id);

        Ok(updated)
    }

    /// Gate for the external video widget: verifies the caller is a
    /// participant and the consult is joinable, activating it on the first
    /// join. Joining an already-active consult is a no-op.
    pub async fn validate_access(
        &self,
        principal: &Principal,
        room_id: &str,
    ) -> Result<RoomAccess, error::SystemError> {
        let session = self
            .session_repo
            .find_by_room(room_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Session not found"))?;

        let caller_role =
            authorize_participant(principal, &session.patient_id, &session.doctor_id)?;

        self.check_expiry(&session).await?;

        let session = match session.status {
            SessionStatus::Accepted => match self.session_repo.activate(&session.id).await? {
                Some(activated) => {
                    let other = match caller_role {
                        Role::Patient => activated.doctor_id,
                        Role::Doctor => activated.patient_id,
                    };
                    self.ws_server.do_send(SendToPrincipal {
                        principal_id: other,
                        message: ServerMessage::ConsultStarted {
                            session_id: activated.id,
                            room_id: activated.room_id.clone(),
                        },
                    });
                    activated
                }
                // Lost the activation race to the other participant; the
                // session is active either way.
                None => self
                    .session_repo
                    .find_by_room(room_id)
                    .await?
                    .filter(|s| s.status == SessionStatus::Active)
                    .ok_or_else(|| {
                        error::SystemError::state_conflict("Consultation is not active")
                    })?,
            },
            SessionStatus::Active => session,
            _ => {
                return Err(error::SystemError::state_conflict("Consultation is not active"));
            }
        };

        Ok(RoomAccess { can_join: true, user_role: caller_role, session })
    }

    /// active → completed; either participant may end the consult.
    pub async fn complete(
        &self,
        principal: &Principal,
        room_id: &str,
    ) -> Result<SessionEntity, error::SystemError> {
        let session = self
            .session_repo
            .find_by_room(room_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Session not found"))?;

        authorize_participant(principal, &session.patient_id, &session.doctor_id)?;

        self.session_repo
            .complete(&session.id)
            .await?
            .ok_or_else(|| error::SystemError::state_conflict("Consultation is not active"))
    }

    pub async fn my_sessions(
        &self,
        patient: &Principal,
    ) -> Result<Vec<SessionEntity>, error::SystemError> {
        self.session_repo.expire_stale_for_patient(&patient.id, self.cutoff()).await?;
        self.session_repo.list_for_patient(&patient.id).await
    }

    pub async fn doctor_sessions(
        &self,
        doctor: &Principal,
    ) -> Result<Vec<SessionEntity>, error::SystemError> {
        self.session_repo.expire_stale_for_doctor(&doctor.id, self.cutoff()).await?;
        self.session_repo.list_for_doctor(&doctor.id).await
    }

    pub async fn update_availability(
        &self,
        doctor: &Principal,
        update: &AvailabilityUpdate,
    ) -> Result<DoctorAvailability, error::SystemError> {
        if doctor.role != Role::Doctor {
            return Err(error::SystemError::forbidden("Only doctors can update availability"));
        }

        self.account_repo
            .update_doctor_availability(&doctor.id, update)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Doctor not found"))
    }
}
