/// WebSocket HTTP Handler
///
/// Upgrades the HTTP request and runs the bidirectional bridge:
/// - Inbound:  client -> WebSocket -> parse ClientMessage -> connection actor
/// - Outbound: server actor -> connection actor -> mpsc channel -> WebSocket -> client
use actix::Addr;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::Message;
use tokio::sync::mpsc;

use super::message::ClientMessage;
use super::server::ConsultServer;
use super::session::ConsultConnection;
use crate::modules::access::service::AccessSvc;
use crate::modules::message::service::MessageSvc;

/// Log-safe prefix of a client frame. Truncates on character boundaries;
/// a byte-indexed slice would panic mid-codepoint on multibyte text.
fn frame_preview(frame: &str) -> String {
    frame.chars().take(100).collect()
}

/// Endpoint: GET /ws
///
/// Flow:
/// 1. HTTP handshake -> WebSocket connection
/// 2. Create mpsc channel (connection actor -> client)
/// 3. Start the ConsultConnection actor
/// 4. Spawn the bidirectional message loop
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    server: web::Data<Addr<ConsultServer>>,
    access_service: web::Data<AccessSvc>,
    message_service: web::Data<MessageSvc>,
) -> Result<HttpResponse, Error> {
    tracing::debug!("WebSocket upgrade request from {:?}", req.peer_addr());

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let ws_actor =
        ConsultConnection::new(server.get_ref().clone(), tx, access_service, message_service);

    use actix::Actor;
    let addr = ws_actor.start();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                // inbound: client -> server
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let text_str = text.to_string();

                            match serde_json::from_str::<ClientMessage>(&text_str) {
                                Ok(client_msg) => {
                                    addr.do_send(client_msg);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        "Unparseable client frame: {} - raw: {}",
                                        e,
                                        frame_preview(&text_str)
                                    );
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Failed to send pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {}

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary frames are not supported");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        // stream ended, client disconnected
                        None => break,
                    }
                }

                // outbound: server -> client
                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Failed to push frame to WebSocket client");
                        break;
                    }
                }
            }
        }

        let _ = ws_session.close(None).await;
        tracing::debug!("WebSocket message loop ended");
    });

    tracing::info!("WebSocket connection established");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_preview_handles_multibyte_past_the_cutoff() {
        // 200 three-byte characters; byte 100 falls mid-codepoint.
        let frame = "ệ".repeat(200);
        let preview = frame_preview(&frame);
        assert_eq!(preview.chars().count(), 100);
    }

    #[test]
    fn frame_preview_keeps_short_frames_whole() {
        assert_eq!(frame_preview(r#"{"type":"ping"}"#), r#"{"type":"ping"}"#);
    }
}
