/// WebSocket Message Protocol
///
/// Frame types exchanged between client and server over the WebSocket
/// connection. The discriminator is a camelCase `type` field.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::{
    account::schema::Role,
    message::model::AttachmentMeta,
    session::schema::{RespondAction, SessionStatus},
};

/// Frames sent from client to server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Authenticate the connection with a JWT access token. Must be the
    /// first frame; everything else is rejected until it succeeds.
    #[serde(rename_all = "camelCase")]
    Auth { token: String },

    /// Enter an appointment room to receive its real-time traffic.
    #[serde(rename_all = "camelCase")]
    JoinRoom { appointment_id: Uuid },

    /// Leave an appointment room.
    #[serde(rename_all = "camelCase")]
    LeaveRoom { appointment_id: Uuid },

    /// Send a chat message into an appointment's conversation.
    #[serde(rename_all = "camelCase")]
    SendMessage { appointment_id: Uuid, body: String, attachment: Option<AttachmentMeta> },

    /// Acknowledge everything unread in an appointment's conversation.
    #[serde(rename_all = "camelCase")]
    MarkRead { appointment_id: Uuid },

    /// Typing indicators, fanned out to the room without persistence.
    #[serde(rename_all = "camelCase")]
    TypingStart { appointment_id: Uuid },

    #[serde(rename_all = "camelCase")]
    TypingStop { appointment_id: Uuid },

    /// Application-level keepalive.
    Ping,
}

/// Frames sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    AuthSuccess { principal_id: Uuid, role: Role },

    /// Authentication failed; the server closes the connection after
    /// sending this frame.
    #[serde(rename_all = "camelCase")]
    AuthFailed { reason: String },

    /// New chat message, delivered to everyone in the appointment room.
    #[serde(rename_all = "camelCase")]
    NewMessage {
        appointment_id: Uuid,
        message: serde_json::Value, // full message object
    },

    /// Lightweight nudge for a receiver who is connected but not in the
    /// appointment room.
    #[serde(rename_all = "camelCase")]
    MessageNotification {
        appointment_id: Uuid,
        sender_id: Uuid,
        preview: String,
        sent_at: String,
    },

    /// Read receipt fanned out to the room.
    #[serde(rename_all = "camelCase")]
    MessagesRead { appointment_id: Uuid, reader_id: Uuid, reader_role: Role },

    #[serde(rename_all = "camelCase")]
    UserTyping { appointment_id: Uuid, principal_id: Uuid },

    #[serde(rename_all = "camelCase")]
    UserStoppedTyping { appointment_id: Uuid, principal_id: Uuid },

    /// A patient is requesting a consultation; delivered to the doctor.
    #[serde(rename_all = "camelCase")]
    IncomingConsult {
        session_id: Uuid,
        room_id: String,
        patient_id: Uuid,
        patient_name: String,
        fee: i64,
        duration_estimate_minutes: i32,
        created_at: String,
    },

    /// The doctor accepted or rejected; delivered to the patient.
    #[serde(rename_all = "camelCase")]
    ConsultResponse {
        session_id: Uuid,
        room_id: String,
        action: RespondAction,
        status: SessionStatus,
    },

    /// The first participant joined the room; delivered to the other one.
    #[serde(rename_all = "camelCase")]
    ConsultStarted { session_id: Uuid, room_id: String },

    /// Response to an application-level Ping.
    Pong,

    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_auth_deserialize() {
        let json = r#"{"type":"auth","token":"my-jwt-token"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Auth { token } if token == "my-jwt-token"));
    }

    #[test]
    fn client_send_message_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"sendMessage","appointmentId":"{}","body":"How are you feeling today?"}}"#,
            id
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::SendMessage { appointment_id, body, attachment } => {
                assert_eq!(appointment_id, id);
                assert_eq!(body, "How are you feeling today?");
                assert!(attachment.is_none());
            }
            _ => panic!("Expected SendMessage variant"),
        }
    }

    #[test]
    fn client_send_message_with_attachment_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(
            r#"{{"type":"sendMessage","appointmentId":"{}","body":"Lab results attached","attachment":{{"url":"https://store.example.com/f/1","name":"results.pdf","size":2048,"mimeType":"application/pdf"}}}}"#,
            id
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::SendMessage { attachment: Some(meta), .. } => {
                assert_eq!(meta.name, "results.pdf");
                assert_eq!(meta.mime_type, "application/pdf");
            }
            _ => panic!("Expected SendMessage with attachment"),
        }
    }

    #[test]
    fn client_join_room_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"joinRoom","appointmentId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { appointment_id } if appointment_id == id));
    }

    #[test]
    fn client_mark_read_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"markRead","appointmentId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::MarkRead { appointment_id } if appointment_id == id));
    }

    #[test]
    fn client_ping_deserialize() {
        let json = r#"{"type":"ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn invalid_type_returns_error() {
        let json = r#"{"type":"unknownType"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn missing_required_field_returns_error() {
        // sendMessage without body
        let json =
            r#"{"type":"sendMessage","appointmentId":"550e8400-e29b-41d4-a716-446655440000"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn server_auth_success_serialize() {
        let uid = Uuid::now_v7();
        let msg = ServerMessage::AuthSuccess { principal_id: uid, role: Role::Doctor };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"authSuccess\""));
        assert!(json.contains("\"role\":\"doctor\""));
        assert!(json.contains(&uid.to_string()));
    }

    #[test]
    fn server_auth_failed_serialize() {
        let msg = ServerMessage::AuthFailed { reason: "Token expired".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"authFailed\""));
        assert!(json.contains("Token expired"));
    }

    #[test]
    fn server_new_message_serialize() {
        let id = Uuid::now_v7();
        let msg = ServerMessage::NewMessage {
            appointment_id: id,
            message: serde_json::json!({"body": "Hello"}),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"newMessage\""));
        assert!(json.contains("\"body\":\"Hello\""));
    }

    #[test]
    fn server_incoming_consult_serialize() {
        let msg = ServerMessage::IncomingConsult {
            session_id: Uuid::now_v7(),
            room_id: "consult_abc".to_string(),
            patient_id: Uuid::now_v7(),
            patient_name: "Jane Roe".to_string(),
            fee: 50000,
            duration_estimate_minutes: 20,
            created_at: "2026-08-26T10:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"incomingConsult\""));
        assert!(json.contains("\"roomId\":\"consult_abc\""));
        assert!(json.contains("\"durationEstimateMinutes\":20"));
    }

    #[test]
    fn server_consult_response_serialize() {
        let msg = ServerMessage::ConsultResponse {
            session_id: Uuid::now_v7(),
            room_id: "consult_abc".to_string(),
            action: RespondAction::Accept,
            status: SessionStatus::Accepted,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"consultResponse\""));
        assert!(json.contains("\"action\":\"accept\""));
        assert!(json.contains("\"status\":\"accepted\""));
    }

    #[test]
    fn server_pong_serialize() {
        let json = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn server_messages_read_serialize() {
        let aid = Uuid::now_v7();
        let rid = Uuid::now_v7();
        let msg = ServerMessage::MessagesRead {
            appointment_id: aid,
            reader_id: rid,
            reader_role: Role::Patient,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"messagesRead\""));
        assert!(json.contains("\"readerRole\":\"patient\""));
    }
}
