//! WebSocket transport for the relay.
//!
//! Each session event is sent as one JSON text frame. The socket is
//! one-way: text sent by the client is ignored.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use super::Relay;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to a relay WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let relay = Relay::new(Arc::clone(&state.session_service));
    ws.on_upgrade(move |socket| run_connection(socket, relay))
}

/// Runs the relay loop for a single WebSocket connection.
///
/// - Forwards every relay event to the client as a text frame.
/// - Ends on a client Close frame, a transport error, or a failed send.
pub async fn run_connection(socket: WebSocket, mut relay: Relay) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    relay.start();

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws receive failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
            // Event from the relay
            event = relay.next_event() => {
                let Some(event) = event else {
                    break;
                };
                let json = match event.to_json() {
                    Ok(json) => json,
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            kind = event.event_type_str(),
                            "dropping unserializable event"
                        );
                        continue;
                    }
                };
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    relay.close();
    let _ = ws_tx.close().await;
    tracing::debug!("ws connection closed");
}
