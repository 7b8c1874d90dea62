use actix_web::{post, put, web, HttpRequest};

use crate::{
    api::{error, success},
    middlewares::get_principal,
    modules::message::{
        model::{MarkReadRequest, SendMessageRequest},
        schema::MessageEntity,
        service::MessageSvc,
    },
    utils::ValidatedJson,
};

#[post("/send")]
pub async fn send_message(
    message_svc: web::Data<MessageSvc>,
    body: ValidatedJson<SendMessageRequest>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let principal = get_principal(&req)?;

    let message = message_svc
        .send_message(&principal, &body.0.appointment_id, body.0.body, body.0.attachment)
        .await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully"))
}

#[put("/mark-read")]
pub async fn mark_read(
    message_svc: web::Data<MessageSvc>,
    body: ValidatedJson<MarkReadRequest>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let principal = get_principal(&req)?;

    message_svc.mark_read(&principal, &body.0.appointment_id).await?;

    Ok(success::Success::ok(None).message("Messages marked as read"))
}
