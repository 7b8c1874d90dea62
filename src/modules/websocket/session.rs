/// WebSocket Connection Actor
///
/// One ConsultConnection actor per WebSocket connection. The actor holds
/// the connection's auth state and pushes frames to the client through an
/// mpsc channel bridged in handler.rs.
///
/// Async work (token verification, persistence) runs through
/// `ctx.spawn()` + `into_actor()`.
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::modules::access::service::AccessSvc;
use crate::modules::account::schema::Principal;
use crate::modules::message::model::AttachmentMeta;
use crate::modules::message::service::MessageSvc;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::server::ConsultServer;

pub struct ConsultConnection {
    /// Unique connection ID
    pub id: Uuid,

    /// Authenticated principal, None until the auth frame succeeds
    pub principal: Option<Principal>,

    /// Address of the ConsultServer actor
    pub server: Addr<ConsultServer>,

    /// Channel pushing JSON frames to the client (bridge in handler.rs)
    pub tx: mpsc::UnboundedSender<String>,

    /// Verifies tokens and appointment membership
    pub access_service: actix_web::web::Data<AccessSvc>,

    /// Persists chat messages and read receipts
    pub message_service: actix_web::web::Data<MessageSvc>,
}

impl ConsultConnection {
    pub fn new(
        server: Addr<ConsultServer>,
        tx: mpsc::UnboundedSender<String>,
        access_service: actix_web::web::Data<AccessSvc>,
        message_service: actix_web::web::Data<MessageSvc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            principal: None,
            server,
            tx,
            access_service,
            message_service,
        }
    }

    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!("Failed to push frame to client (connection {}): {}", self.id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize ServerMessage (connection {}): {}", self.id, e);
            }
        }
    }

    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::Error { message: message.to_string() });
    }

    /// Returns the principal if authenticated, otherwise rejects the frame.
    fn require_auth(&self) -> Option<Principal> {
        if self.principal.is_none() {
            self.send_error("You must authenticate before performing this action");
            tracing::warn!("Connection {} not authenticated, frame rejected", self.id);
        }
        self.principal
    }

    fn handle_client_message(&mut self, msg: &ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::Auth { token } => {
                self.handle_auth(token.clone(), ctx);
            }

            ClientMessage::JoinRoom { appointment_id } => {
                self.handle_join_room(*appointment_id, ctx);
            }

            ClientMessage::LeaveRoom { appointment_id } => {
                self.handle_leave_room(*appointment_id);
            }

            ClientMessage::SendMessage { appointment_id, body, attachment } => {
                self.handle_send_message(*appointment_id, body.clone(), attachment.clone(), ctx);
            }

            ClientMessage::MarkRead { appointment_id } => {
                self.handle_mark_read(*appointment_id, ctx);
            }

            ClientMessage::TypingStart { appointment_id } => {
                self.handle_typing(*appointment_id, true);
            }

            ClientMessage::TypingStop { appointment_id } => {
                self.handle_typing(*appointment_id, false);
            }

            ClientMessage::Ping => {
                self.send_to_client(&ServerMessage::Pong);
            }
        }
    }

    /// Verify the access token, resolve the account and bind the principal
    /// to this connection. A failed attempt closes the connection.
    fn handle_auth(&mut self, token: String, ctx: &mut Context<Self>) {
        if self.principal.is_some() {
            self.send_error("Connection already authenticated");
            return;
        }

        let access = self.access_service.clone();
        let connection_id = self.id;

        ctx.spawn(
            async move { access.authenticate(&token).await }
                .into_actor(self)
                .map(move |result, act, ctx| match result {
                    Ok(principal) => {
                        act.principal = Some(principal);

                        act.server.do_send(Authenticate {
                            session_id: act.id,
                            principal_id: principal.id,
                        });

                        act.send_to_client(&ServerMessage::AuthSuccess {
                            principal_id: principal.id,
                            role: principal.role,
                        });

                        tracing::info!(
                            "Principal {} authenticated on connection {}",
                            principal.id,
                            act.id
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            "WebSocket auth failed (connection {}): {}",
                            connection_id,
                            e
                        );
                        act.send_to_client(&ServerMessage::AuthFailed {
                            reason: "Invalid or expired token".to_string(),
                        });
                        ctx.stop();
                    }
                }),
        );
    }

    /// Join an appointment room after re-checking the caller is one of the
    /// appointment's two participants.
    fn handle_join_room(&self, appointment_id: Uuid, ctx: &mut Context<Self>) {
        let Some(principal) = self.require_auth() else {
            return;
        };

        let access = self.access_service.clone();

        ctx.spawn(
            async move { access.authorize_appointment(&principal, &appointment_id).await }
                .into_actor(self)
                .map(move |result, act, _ctx| match result {
                    Ok(_) => {
                        act.server.do_send(JoinRoom {
                            principal_id: principal.id,
                            appointment_id,
                        });
                        tracing::debug!(
                            "Principal {} joined appointment room {}",
                            principal.id,
                            appointment_id
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Room join rejected for principal {} on appointment {}: {}",
                            principal.id,
                            appointment_id,
                            e
                        );
                        act.send_error("You do not have access to this appointment");
                    }
                }),
        );
    }

    fn handle_leave_room(&self, appointment_id: Uuid) {
        let Some(principal) = self.require_auth() else {
            return;
        };

        self.server.do_send(LeaveRoom { principal_id: principal.id, appointment_id });
    }

    /// Persist a chat message; the message service broadcasts the result.
    fn handle_send_message(
        &self,
        appointment_id: Uuid,
        body: String,
        attachment: Option<AttachmentMeta>,
        ctx: &mut Context<Self>,
    ) {
        let Some(principal) = self.require_auth() else {
            return;
        };

        let service = self.message_service.clone();
        let tx = self.tx.clone();
        let connection_id = self.id;

        ctx.spawn(
            async move {
                if let Err(e) =
                    service.send_message(&principal, &appointment_id, body, attachment).await
                {
                    tracing::error!(
                        "Failed to send message (connection {}, appointment {}): {}",
                        connection_id,
                        appointment_id,
                        e
                    );

                    // Validation and state failures keep their specific
                    // text; internals stay generic.
                    let err_msg =
                        ServerMessage::Error { message: e.client_message().into_owned() };
                    if let Ok(json) = serde_json::to_string(&err_msg) {
                        let _ = tx.send(json);
                    }
                }
            }
            .into_actor(self),
        );
    }

    /// Acknowledge unread messages; the message service emits the read
    /// receipt to the room.
    fn handle_mark_read(&self, appointment_id: Uuid, ctx: &mut Context<Self>) {
        let Some(principal) = self.require_auth() else {
            return;
        };

        let service = self.message_service.clone();
        let connection_id = self.id;

        ctx.spawn(
            async move {
                if let Err(e) = service.mark_read(&principal, &appointment_id).await {
                    tracing::error!(
                        "Failed to mark messages read (connection {}, appointment {}): {}",
                        connection_id,
                        appointment_id,
                        e
                    );
                }
            }
            .into_actor(self),
        );
    }

    /// Typing indicators are not persisted, only fanned out to the room
    /// minus the sender.
    fn handle_typing(&self, appointment_id: Uuid, start: bool) {
        let Some(principal) = self.require_auth() else {
            return;
        };

        let message = if start {
            ServerMessage::UserTyping { appointment_id, principal_id: principal.id }
        } else {
            ServerMessage::UserStoppedTyping { appointment_id, principal_id: principal.id }
        };

        self.server.do_send(BroadcastToRoom {
            appointment_id,
            message,
            skip_principal_id: Some(principal.id),
        });
    }
}

impl Actor for ConsultConnection {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket connection started: {}", self.id);
        self.server.do_send(Connect { id: self.id, addr: ctx.address() });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket connection stopped: {}", self.id);
        self.server.do_send(Disconnect { id: self.id });
    }
}

impl Message for ClientMessage {
    type Result = ();
}

/// Frames parsed in handler.rs arrive here.
impl Handler<ClientMessage> for ConsultConnection {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(&msg, ctx);
    }
}

/// Frames from the server actor are serialized and pushed to the client.
impl Handler<ServerMessage> for ConsultConnection {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}
