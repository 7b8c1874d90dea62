/// WebSocket Actor Events
///
/// Messages exchanged between the connection actors and the central
/// ConsultServer actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::ConsultConnection;

/// A new WebSocket connection opened.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// Unique connection ID
    pub id: Uuid,
    /// Address of the connection actor
    pub addr: Addr<ConsultConnection>,
}

/// A WebSocket connection closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: Uuid,
}

/// A connection has presented a valid access token.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Authenticate {
    pub session_id: Uuid,
    /// Patient or doctor the connection now speaks for
    pub principal_id: Uuid,
}

/// A principal entered an appointment room.
#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinRoom {
    pub principal_id: Uuid,
    pub appointment_id: Uuid,
}

/// A principal left an appointment room.
#[derive(Message)]
#[rtype(result = "()")]
pub struct LeaveRoom {
    pub principal_id: Uuid,
    pub appointment_id: Uuid,
}

/// Fan a frame out to every principal currently in an appointment room.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct BroadcastToRoom {
    pub appointment_id: Uuid,
    pub message: ServerMessage,
    /// Skip this principal (typing indicators skip the sender)
    pub skip_principal_id: Option<Uuid>,
}

/// Deliver a frame to every live connection of one principal.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToPrincipal {
    pub principal_id: Uuid,
    pub message: ServerMessage,
}
