//! Ranking handlers: top players and per-name statistics.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{RankingParams, RankingResponse};
use crate::app_state::AppState;
use crate::domain::PlayerStats;
use crate::error::{ErrorResponse, SessionError};

/// `GET /ranking` — Top players by wins.
#[utoipa::path(
    get,
    path = "/api/v1/ranking",
    tag = "Ranking",
    summary = "Top players",
    description = "Returns up to `limit` stats records sorted by descending wins. Names in the ranking index without a stats record are skipped.",
    params(RankingParams),
    responses(
        (status = 200, description = "Ranking", body = RankingResponse),
    )
)]
pub async fn ranking(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> impl IntoResponse {
    let top_players = state.session_service.top_players(params.limit).await;
    Json(RankingResponse { top_players })
}

/// `GET /players/:name/stats` — Statistics of one name.
///
/// # Errors
///
/// Returns [`SessionError::StatsNotFound`] if the name never finished a
/// round.
#[utoipa::path(
    get,
    path = "/api/v1/players/{name}/stats",
    tag = "Ranking",
    summary = "Player statistics",
    description = "Returns the aggregate counters of a display name. Counters survive session resets.",
    params(
        ("name" = String, Path, description = "Display name"),
    ),
    responses(
        (status = 200, description = "Statistics", body = PlayerStats),
        (status = 404, description = "No statistics for this name", body = ErrorResponse),
    )
)]
pub async fn player_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, SessionError> {
    let stats = state.session_service.stats(&name).await?;
    Ok(Json(stats))
}

/// Ranking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ranking", get(ranking))
        .route("/players/{name}/stats", get(player_stats))
}
