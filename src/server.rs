//! HTTP/WebSocket surface.
//!
//! One port serves both the static assets and the game channel: the
//! `/ws` route upgrades to a WebSocket and everything else falls back
//! to the asset directory. Each socket gets a pump task that drains
//! the connection's outbox onto the wire, while the handler task
//! parses inbound frames and dispatches them to the [`SessionManager`].

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{ConnId, Outbox, SessionManager};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::path::Path;
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tracing::{debug, info, instrument, warn};

/// Builds the application router over a shared session manager.
pub fn router(sessions: SessionManager, assets: &Path) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(assets))
        .with_state(sessions)
}

/// Upgrades `/ws` requests and hands the socket to the session loop.
async fn ws_handler(State(sessions): State<SessionManager>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, sessions))
}

/// Drives one connection from accept to disconnect.
///
/// The disconnect transition runs on every exit path, so a dropped
/// socket always releases its seat and, when it was the last one,
/// its room.
#[instrument(skip(socket, sessions))]
async fn handle_socket(socket: WebSocket, sessions: SessionManager) {
    let conn = sessions.register_connection();
    info!(conn, "Connection accepted");

    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();

    let pump = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(error) => {
                    warn!(%error, "Failed to serialize outbound message");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                debug!(conn, %error, "Socket error, closing");
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(error) => {
                        debug!(conn, %error, "Dropping malformed message");
                        continue;
                    }
                };
                dispatch(&sessions, conn, &outbox, msg);
            }
            Message::Close(_) => break,
            // Binary frames are protocol violations; ping/pong are
            // handled by the transport.
            _ => {}
        }
    }

    sessions.disconnect(conn);
    pump.abort();
    info!(conn, "Connection closed");
}

/// Routes one parsed client message to the session manager.
fn dispatch(sessions: &SessionManager, conn: ConnId, outbox: &Outbox, msg: ClientMessage) {
    match msg {
        ClientMessage::Join { room } => sessions.join(conn, outbox.clone(), &room),
        ClientMessage::Move { index } => sessions.apply_move(conn, index),
        ClientMessage::Restart => sessions.restart(conn),
    }
}
