/// Messaging Service
///
/// Persists conversations and messages, maintains per-party unread
/// counters, and fans the results out through the delivery channel.
/// Authorization is checked against the appointment registry before any
/// mutation.
use actix::Addr;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        account::{
            repository::AppointmentRepository,
            repository_pg::AppointmentRepositoryPg,
            schema::Principal,
        },
        conversation::{repository::ConversationRepository, repository_pg::ConversationRepositoryPg},
        message::{
            model::{check_body, summarize, AttachmentMeta, InsertMessage},
            repository::MessageRepository,
            repository_pg::MessageRepositoryPg,
            schema::{MessageEntity, MessageKind},
        },
        websocket::{
            events::{BroadcastToRoom, SendToPrincipal},
            message::ServerMessage,
            server::ConsultServer,
        },
    },
    utils::with_retry,
    ENV,
};

pub type MessageSvc =
    MessageService<MessageRepositoryPg, ConversationRepositoryPg, AppointmentRepositoryPg>;

#[derive(Clone)]
pub struct MessageService<M, C, P>
where
    M: MessageRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
    appointment_repo: Arc<P>,
    ws_server: Arc<Addr<ConsultServer>>,
}

impl<M, C, P> MessageService<M, C, P>
where
    M: MessageRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        conversation_repo: Arc<C>,
        appointment_repo: Arc<P>,
        ws_server: Arc<Addr<ConsultServer>>,
    ) -> Self {
        MessageService { message_repo, conversation_repo, appointment_repo, ws_server }
    }

    /// Send a message into the appointment's conversation, creating the
    /// conversation on first use.
    ///
    /// Flow:
    /// 1. Participant check against the appointment registry
    /// 2. Attachment validation
    /// 3. In one transaction: lock-or-create the conversation, append the
    ///    message, stamp the summary and the receiver's unread counter
    /// 4. Broadcast to the appointment room + notify the receiver
    pub async fn send_message(
        &self,
        sender: &Principal,
        appointment_id: &Uuid,
        body: String,
        attachment: Option<AttachmentMeta>,
    ) -> Result<MessageEntity, error::SystemError> {
        let participants = self
            .appointment_repo
            .find_participants(appointment_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Appointment not found"))?;

        let receiver = participants
            .counterpart(sender)
            .ok_or_else(|| error::SystemError::forbidden("Access denied"))?;

        check_body(&body)?;

        let kind = match &attachment {
            Some(meta) => {
                meta.check(ENV.max_attachment_size)?;
                meta.kind()
            }
            None => MessageKind::Text,
        };

        let mut tx = with_retry(|| self.conversation_repo.get_pool().begin()).await?;

        let conversation = self
            .conversation_repo
            .lock_or_create(
                appointment_id,
                &participants.patient_id,
                &participants.doctor_id,
                &mut tx,
            )
            .await?;

        let message = self
            .message_repo
            .insert(
                &InsertMessage {
                    conversation_id: conversation.id,
                    appointment_id: *appointment_id,
                    sender_id: sender.id,
                    sender_role: sender.role,
                    receiver_id: receiver.id,
                    receiver_role: receiver.role,
                    body,
                    kind,
                    attachment,
                },
                &mut tx,
            )
            .await?;

        let summary = summarize(&message.body, &message.kind);

        self.conversation_repo
            .record_message(&conversation.id, &summary, message.created_at, &receiver.role, &mut tx)
            .await?;

        tx.commit().await?;

        let message_value = serde_json::to_value(&message).unwrap_or_default();

        self.ws_server.do_send(BroadcastToRoom {
            appointment_id: *appointment_id,
            message: ServerMessage::NewMessage {
                appointment_id: *appointment_id,
                message: message_value,
            },
            skip_principal_id: None,
        });

        // Lightweight nudge for receivers who are connected but not
        // currently in the conversation room.
        self.ws_server.do_send(SendToPrincipal {
            principal_id: receiver.id,
            message: ServerMessage::MessageNotification {
                appointment_id: *appointment_id,
                sender_id: sender.id,
                preview: summary,
                sent_at: message.created_at.to_rfc3339(),
            },
        });

        log::info!(
            "Message {} appended to conversation {} (appointment {})",
            message.id,
            conversation.id,
            appointment_id
        );

        Ok(message)
    }

    /// Zero the caller's unread counter and stamp read state on unread
    /// messages addressed to the caller. Idempotent: a second call finds
    /// nothing unread and changes nothing.
    pub async fn mark_read(
        &self,
        reader: &Principal,
        appointment_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        let participants = self
            .appointment_repo
            .find_participants(appointment_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Appointment not found"))?;

        if participants.side_of(reader).is_none() {
            return Err(error::SystemError::forbidden("Access denied"));
        }

        let Some(conversation) = self.conversation_repo.find_by_appointment(appointment_id).await?
        else {
            // No conversation yet means nothing to acknowledge.
            return Ok(());
        };

        let mut tx = with_retry(|| self.conversation_repo.get_pool().begin()).await?;

        let updated = self.message_repo.mark_read(&conversation.id, &reader.role, &mut tx).await?;
        self.conversation_repo.reset_unread(&conversation.id, &reader.role, &mut tx).await?;

        tx.commit().await?;

        if updated > 0 {
            self.ws_server.do_send(BroadcastToRoom {
                appointment_id: *appointment_id,
                message: ServerMessage::MessagesRead {
                    appointment_id: *appointment_id,
                    reader_id: reader.id,
                    reader_role: reader.role,
                },
                skip_principal_id: Some(reader.id),
            });
        }

        Ok(())
    }
}
