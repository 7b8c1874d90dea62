/// WebSocket Module
///
/// Real-time layer of the consultation platform:
///
/// - Message protocol (ClientMessage & ServerMessage)
/// - ConsultServer actor (connection registry and appointment rooms)
/// - ConsultConnection actor (one per client connection)
/// - HTTP handler (upgrade HTTP into WebSocket)
pub mod events;
pub mod handler;
pub mod message;
pub mod server;
pub mod session;
