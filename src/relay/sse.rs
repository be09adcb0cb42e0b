//! Server-Sent Events transport for the relay.

use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};

use super::Relay;
use crate::app_state::AppState;

/// `GET /api/v1/game/events` — Stream session events as SSE.
///
/// Each event is one `data:` line holding the JSON object. When the client
/// disconnects axum drops the stream, which drops the relay and its bus
/// subscription.
#[utoipa::path(
    get,
    path = "/api/v1/game/events",
    tag = "Game",
    summary = "Session event stream",
    description = "Server-Sent Events stream. The first event is INITIAL_DATA with the current roster; every later event is forwarded from the session event bus in publish order.",
    responses(
        (status = 200, description = "text/event-stream of session events", content_type = "text/event-stream"),
    )
)]
pub async fn events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let relay = Relay::connect(Arc::clone(&state.session_service));
    let stream = relay
        .into_stream()
        .map(|event| Event::default().json_data(event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
