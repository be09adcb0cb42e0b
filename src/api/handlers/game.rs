//! Game handlers: join, move, leave, reset, roster.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    JoinRequest, JoinResponse, LeaveRequest, MoveRequest, MoveResponse, PlayersResponse,
};
use crate::app_state::AppState;
use crate::domain::{Choice, PlayerId};
use crate::error::{ErrorResponse, SessionError};
use crate::relay::sse::events_handler;

/// `POST /game/join` — Join the session.
///
/// # Errors
///
/// Returns [`SessionError::SessionFull`] when two players are already
/// active and [`SessionError::InvalidRequest`] for a bad name.
#[utoipa::path(
    post,
    path = "/api/v1/game/join",
    tag = "Game",
    summary = "Join the session",
    description = "Admits a player while fewer than two are active and publishes PLAYER_JOIN.",
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Player admitted", body = JoinResponse),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 409, description = "Session full", body = ErrorResponse),
    )
)]
pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let player = state.session_service.join(&req.player_name).await?;
    let response = JoinResponse {
        player_id: player.id,
        player,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /game/move` — Record a choice.
///
/// # Errors
///
/// Returns [`SessionError::InvalidRequest`] for a malformed id or unknown
/// choice and [`SessionError::PlayerNotFound`] if the player is not active.
#[utoipa::path(
    post,
    path = "/api/v1/game/move",
    tag = "Game",
    summary = "Record a move",
    description = "Stores the player's choice and publishes MOVE. Once every active player has moved, the round is resolved and GAME_RESULT is published.",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Move recorded", body = MoveResponse),
        (status = 400, description = "Invalid id or choice", body = ErrorResponse),
        (status = 404, description = "Player not found", body = ErrorResponse),
    )
)]
pub async fn make_move(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<impl IntoResponse, SessionError> {
    let player_id = parse_player_id(&req.player_id)?;
    let choice = req
        .choice
        .parse::<Choice>()
        .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;

    let player = state.session_service.record_move(player_id, choice).await?;
    Ok(Json(MoveResponse { player }))
}

/// `POST /game/leave` — Leave the session.
///
/// An id that is not a valid player token cannot name a roster entry, so
/// it is treated like any other absent id: 204 and no event.
///
/// # Errors
///
/// Returns [`SessionError::StoreUnavailable`] if the roster cannot be
/// updated.
#[utoipa::path(
    post,
    path = "/api/v1/game/leave",
    tag = "Game",
    summary = "Leave the session",
    description = "Removes the player if present and publishes PLAYER_LEAVE. Leaving twice, or with an id that was never issued, is not an error.",
    request_body = LeaveRequest,
    responses(
        (status = 204, description = "Player removed or already absent"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn leave(
    State(state): State<AppState>,
    Json(req): Json<LeaveRequest>,
) -> Result<impl IntoResponse, SessionError> {
    match req.player_id.parse::<PlayerId>() {
        Ok(player_id) => state.session_service.leave(player_id).await?,
        Err(_) => tracing::debug!(raw = %req.player_id, "leave with unknown token ignored"),
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /game/reset` — Clear the roster and the ranking index.
///
/// # Errors
///
/// Returns [`SessionError::StoreUnavailable`] if the store fails.
#[utoipa::path(
    post,
    path = "/api/v1/game/reset",
    tag = "Game",
    summary = "Reset the session",
    description = "Clears the roster and the ranking index, keeps per-name statistics, and publishes GAME_RESET.",
    responses(
        (status = 204, description = "Session reset"),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn reset(State(state): State<AppState>) -> Result<impl IntoResponse, SessionError> {
    state.session_service.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /game/players` — Active roster.
#[utoipa::path(
    get,
    path = "/api/v1/game/players",
    tag = "Game",
    summary = "List active players",
    description = "Returns the roster ordered by ascending timestamp. An unreachable store yields an empty list.",
    responses(
        (status = 200, description = "Active players", body = PlayersResponse),
    )
)]
pub async fn players(State(state): State<AppState>) -> impl IntoResponse {
    let players = state.session_service.list_active().await;
    Json(PlayersResponse { players })
}

fn parse_player_id(raw: &str) -> Result<PlayerId, SessionError> {
    raw.parse()
        .map_err(|_| SessionError::InvalidRequest(format!("invalid player id: {raw}")))
}

/// Game routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/game/join", post(join))
        .route("/game/move", post(make_move))
        .route("/game/leave", post(leave))
        .route("/game/reset", post(reset))
        .route("/game/players", get(players))
        .route("/game/events", get(events_handler))
}
