//! Game and ranking DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Player, PlayerId, PlayerStats};
use crate::service::DEFAULT_TOP_PLAYERS;

/// Request body for `POST /game/join`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Display name, 1 to 32 characters after trimming.
    pub player_name: String,
}

/// Response body for `POST /game/join` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// Token to use for later moves and for leaving.
    pub player_id: PlayerId,
    /// The admitted player.
    pub player: Player,
}

/// Request body for `POST /game/move`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Token returned by join.
    pub player_id: String,
    /// `Rock`, `Paper` or `Scissors` (Portuguese names accepted).
    pub choice: String,
}

/// Response body for `POST /game/move`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MoveResponse {
    /// The player with the recorded choice.
    pub player: Player,
}

/// Request body for `POST /game/leave`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Token returned by join.
    pub player_id: String,
}

/// Response body for `GET /game/players`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayersResponse {
    /// Active players ordered by ascending timestamp.
    pub players: Vec<Player>,
}

/// Query parameters for `GET /ranking`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RankingParams {
    /// Number of entries (1 to 50). Defaults to 5.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_TOP_PLAYERS
}

/// Response body for `GET /ranking`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    /// Stats records by descending wins.
    pub top_players: Vec<PlayerStats>,
}
