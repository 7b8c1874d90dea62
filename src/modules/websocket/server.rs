/// WebSocket Server Actor
///
/// ConsultServer owns all live connections, the mapping from principals
/// to their connections, and the appointment rooms. It routes frames
/// between connections but never touches the database.
use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::events::*;
use super::message::ServerMessage;
use super::session::ConsultConnection;

pub struct ConsultServer {
    /// connection_id -> connection actor address
    sessions: HashMap<Uuid, Addr<ConsultConnection>>,

    /// principal_id -> set of connection_ids
    /// One patient or doctor may be connected from several devices.
    principals: HashMap<Uuid, HashSet<Uuid>>,

    /// appointment_id -> set of principal_ids currently in the room
    rooms: HashMap<Uuid, HashSet<Uuid>>,
}

impl ConsultServer {
    pub fn new() -> Self {
        Self { sessions: HashMap::new(), principals: HashMap::new(), rooms: HashMap::new() }
    }

    fn send_to_session(&self, session_id: &Uuid, message: ServerMessage) {
        if let Some(session_addr) = self.sessions.get(session_id) {
            session_addr.do_send(message);
        }
    }

    fn send_to_principal(&self, principal_id: &Uuid, message: ServerMessage) {
        if let Some(session_ids) = self.principals.get(principal_id) {
            for session_id in session_ids {
                self.send_to_session(session_id, message.clone());
            }
        }
    }
}

impl Actor for ConsultServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Consult WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Consult WebSocket server stopped");
    }
}

impl Handler<Connect> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        tracing::debug!("New WebSocket connection: {}", msg.id);
        self.sessions.insert(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        tracing::debug!("WebSocket connection closed: {}", msg.id);

        self.sessions.remove(&msg.id);

        // Drop the connection from whichever principal owned it.
        let mut principal_to_remove: Option<Uuid> = None;
        for (&principal_id, connections) in self.principals.iter_mut() {
            if connections.remove(&msg.id) {
                if connections.is_empty() {
                    principal_to_remove = Some(principal_id);
                }
                break;
            }
        }

        // Last device gone: evict the principal from every room.
        if let Some(principal_id) = principal_to_remove {
            self.principals.remove(&principal_id);

            for room in self.rooms.values_mut() {
                room.remove(&principal_id);
            }
            self.rooms.retain(|_, members| !members.is_empty());

            tracing::info!("Principal {} fully disconnected, removed from all rooms", principal_id);
        }
    }
}

impl Handler<Authenticate> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: Authenticate, _: &mut Context<Self>) {
        let connections = self.principals.entry(msg.principal_id).or_default();
        connections.insert(msg.session_id);

        tracing::info!(
            "Principal {} authenticated on connection {} ({} active connection(s))",
            msg.principal_id,
            msg.session_id,
            connections.len()
        );
    }
}

impl Handler<JoinRoom> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: JoinRoom, _: &mut Context<Self>) {
        self.rooms.entry(msg.appointment_id).or_default().insert(msg.principal_id);

        tracing::debug!(
            "Principal {} joined appointment room {} ({} in room)",
            msg.principal_id,
            msg.appointment_id,
            self.rooms.get(&msg.appointment_id).map_or(0, HashSet::len)
        );
    }
}

impl Handler<LeaveRoom> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: LeaveRoom, _: &mut Context<Self>) {
        if let Some(room) = self.rooms.get_mut(&msg.appointment_id) {
            room.remove(&msg.principal_id);

            tracing::debug!(
                "Principal {} left appointment room {} ({} remaining)",
                msg.principal_id,
                msg.appointment_id,
                room.len()
            );

            if room.is_empty() {
                self.rooms.remove(&msg.appointment_id);
            }
        }
    }
}

impl Handler<BroadcastToRoom> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: BroadcastToRoom, _: &mut Context<Self>) {
        if let Some(members) = self.rooms.get(&msg.appointment_id) {
            let mut sent_count = 0;

            for &principal_id in members {
                if msg.skip_principal_id == Some(principal_id) {
                    continue;
                }

                if let Some(session_ids) = self.principals.get(&principal_id) {
                    for session_id in session_ids {
                        self.send_to_session(session_id, msg.message.clone());
                        sent_count += 1;
                    }
                }
            }

            tracing::debug!(
                "Broadcast to room {}: {} connection(s)",
                msg.appointment_id,
                sent_count
            );
        } else {
            tracing::debug!("Broadcast to empty room {}", msg.appointment_id);
        }
    }
}

impl Handler<SendToPrincipal> for ConsultServer {
    type Result = ();

    fn handle(&mut self, msg: SendToPrincipal, _: &mut Context<Self>) {
        if self.principals.contains_key(&msg.principal_id) {
            self.send_to_principal(&msg.principal_id, msg.message);
        } else {
            // Offline principals catch up through unread counters and
            // session listings on their next request.
            tracing::debug!("Principal {} not connected, frame dropped", msg.principal_id);
        }
    }
}

/// Lets the server forward ServerMessage frames straight to connection
/// actors.
impl Message for ServerMessage {
    type Result = ();
}

impl Default for ConsultServer {
    fn default() -> Self {
        Self::new()
    }
}
