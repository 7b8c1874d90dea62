/// Conversation Service
///
/// Read side of the messaging subsystem: conversation listings, unread
/// roll-ups and per-appointment history. All reads are scoped to the
/// calling principal.
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        account::{repository::AppointmentRepository, repository_pg::AppointmentRepositoryPg, schema::Principal},
        conversation::{
            model::{ConversationListItem, UnreadTotals},
            repository::ConversationRepository,
            repository_pg::ConversationRepositoryPg,
        },
        message::{repository::MessageRepository, repository_pg::MessageRepositoryPg, schema::MessageEntity},
    },
    ENV,
};

pub type ConversationSvc =
    ConversationService<ConversationRepositoryPg, MessageRepositoryPg, AppointmentRepositoryPg>;

#[derive(Clone)]
pub struct ConversationService<C, M, P>
where
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    conversation_repo: Arc<C>,
    message_repo: Arc<M>,
    appointment_repo: Arc<P>,
}

impl<C, M, P> ConversationService<C, M, P>
where
    C: ConversationRepository + Send + Sync,
    M: MessageRepository + Send + Sync,
    P: AppointmentRepository + Send + Sync,
{
    pub fn with_dependencies(
        conversation_repo: Arc<C>,
        message_repo: Arc<M>,
        appointment_repo: Arc<P>,
    ) -> Self {
        ConversationService { conversation_repo, message_repo, appointment_repo }
    }

    /// Conversations the caller participates in, most recent activity
    /// first, each annotated with the caller's own unread count.
    pub async fn list_conversations(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ConversationListItem>, error::SystemError> {
        let conversations =
            self.conversation_repo.list_for(&principal.id, &principal.role).await?;

        Ok(conversations
            .into_iter()
            .map(|c| {
                let unread_count = c.unread_for(&principal.role);
                ConversationListItem {
                    id: c.id,
                    appointment_id: c.appointment_id,
                    patient_id: c.patient_id,
                    doctor_id: c.doctor_id,
                    last_message_summary: c.last_message_summary,
                    last_message_at: c.last_message_at,
                    unread_count,
                }
            })
            .collect())
    }

    /// Aggregate unread counts across every conversation the caller is in.
    pub async fn unread_totals(
        &self,
        principal: &Principal,
    ) -> Result<UnreadTotals, error::SystemError> {
        let conversations =
            self.conversation_repo.list_for(&principal.id, &principal.role).await?;

        let total_unread = conversations
            .iter()
            .map(|c| i64::from(c.unread_for(&principal.role)))
            .sum();

        Ok(UnreadTotals { total_unread, conversations: conversations.len() })
    }

    /// Chronological message history for one appointment. Participants
    /// only. An appointment with no conversation yet yields an empty list.
    pub async fn history(
        &self,
        principal: &Principal,
        appointment_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let participants = self
            .appointment_repo
            .find_participants(appointment_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Appointment not found"))?;

        if participants.side_of(principal).is_none() {
            return Err(error::SystemError::forbidden("Access denied"));
        }

        let Some(conversation) = self.conversation_repo.find_by_appointment(appointment_id).await?
        else {
            return Ok(Vec::new());
        };

        self.message_repo.list_by_conversation(&conversation.id, ENV.history_limit).await
    }
}
