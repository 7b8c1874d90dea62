use actix_web::{get, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_principal,
    modules::{
        conversation::{
            model::{ConversationListItem, UnreadTotals},
            service::ConversationSvc,
        },
        message::schema::MessageEntity,
    },
};

#[get("/conversations")]
pub async fn list_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationListItem>>, error::Error> {
    let principal = get_principal(&req)?;

    let conversations = conversation_svc.list_conversations(&principal).await?;

    Ok(success::Success::ok(Some(conversations)))
}

#[get("/unread-counts")]
pub async fn unread_counts(
    conversation_svc: web::Data<ConversationSvc>,
    req: HttpRequest,
) -> Result<success::Success<UnreadTotals>, error::Error> {
    let principal = get_principal(&req)?;

    let totals = conversation_svc.unread_totals(&principal).await?;

    Ok(success::Success::ok(Some(totals)))
}

#[get("/history/{appointment_id}")]
pub async fn history(
    conversation_svc: web::Data<ConversationSvc>,
    appointment_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let principal = get_principal(&req)?;

    let messages = conversation_svc.history(&principal, &appointment_id).await?;

    Ok(success::Success::ok(Some(messages)))
}
