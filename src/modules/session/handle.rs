use actix_web::{get, post, put, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_principal,
    modules::{
        account::schema::DoctorAvailability,
        session::{
            model::{CreateSessionRequest, RespondRequest, RoomAccess},
            schema::SessionEntity,
            service::SessionSvc,
        },
    },
    utils::ValidatedJson,
};

#[post("/create")]
pub async fn create_session(
    session_svc: web::Data<SessionSvc>,
    body: ValidatedJson<CreateSessionRequest>,
    req: HttpRequest,
) -> Result<success::Success<SessionEntity>, error::Error> {
    let principal = get_principal(&req)?;

    let session = session_svc.create(&principal, &body.0).await?;

    Ok(success::Success::created(Some(session)).message("Consultation request sent successfully"))
}

#[post("/respond")]
pub async fn respond(
    session_svc: web::Data<SessionSvc>,
    body: ValidatedJson<RespondRequest>,
    req: HttpRequest,
) -> Result<success::Success<SessionEntity>, error::Error> {
    let principal = get_principal(&req)?;

    let session = session_svc.respond(&principal, &body.0.session_id, body.0.action).await?;

    Ok(success::Success::ok(Some(session)).message("Response recorded successfully"))
}

#[get("/{room_id}/validate")]
pub async fn validate_room(
    session_svc: web::Data<SessionSvc>,
    room_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<RoomAccess>, error::Error> {
    let principal = get_principal(&req)?;

    let access = session_svc.validate_access(&principal, &room_id).await?;

    Ok(success::Success::ok(Some(access)))
}

#[post("/{room_id}/complete")]
pub async fn complete_session(
    session_svc: web::Data<SessionSvc>,
    room_id: web::Path<String>,
    req: HttpRequest,
) -> Result<success::Success<SessionEntity>, error::Error> {
    let principal = get_principal(&req)?;

    let session = session_svc.complete(&principal, &room_id).await?;

    Ok(success::Success::ok(Some(session)).message("Consultation completed"))
}

#[get("/my-sessions")]
pub async fn my_sessions(
    session_svc: web::Data<SessionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SessionEntity>>, error::Error> {
    let principal = get_principal(&req)?;

    let sessions = session_svc.my_sessions(&principal).await?;

    Ok(success::Success::ok(Some(sessions)))
}

#[get("/doctor-sessions")]
pub async fn doctor_sessions(
    session_svc: web::Data<SessionSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SessionEntity>>, error::Error> {
    let principal = get_principal(&req)?;

    let sessions = session_svc.doctor_sessions(&principal).await?;

    Ok(success::Success::ok(Some(sessions)))
}

#[put("/doctor-settings")]
pub async fn doctor_settings(
    session_svc: web::Data<SessionSvc>,
    body: ValidatedJson<crate::modules::account::schema::AvailabilityUpdate>,
    req: HttpRequest,
) -> Result<success::Success<DoctorAvailability>, error::Error> {
    let principal = get_principal(&req)?;

    let availability = session_svc.update_availability(&principal, &body.0).await?;

    Ok(success::Success::ok(Some(availability)).message("Settings updated successfully"))
}
