//! Session-change notifications carried over the event bus.
//!
//! Every coordinator mutation emits a [`SessionEvent`] through the
//! [`super::EventBus`]. Relays serialize each event to one JSON object
//! discriminated by `type`, and clients fold them with
//! [`crate::client::SessionView`].

use serde::{Deserialize, Serialize};

use super::{Player, PlayerId, RoundOutcome, now_millis};
use crate::error::SessionError;

/// Closed set of session events, one variant per wire `type`.
///
/// Every variant carries the publication time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum SessionEvent {
    /// Full roster snapshot sent to a relay client on connect.
    InitialData {
        /// Active players ordered by ascending timestamp.
        players: Vec<Player>,
        /// Snapshot time.
        timestamp: i64,
    },

    /// A player joined the roster.
    PlayerJoin {
        /// The admitted player.
        player: Player,
        /// Publication time.
        timestamp: i64,
    },

    /// A player left the roster.
    PlayerLeave {
        /// Identifier of the departed player.
        player_id: PlayerId,
        /// Publication time.
        timestamp: i64,
    },

    /// A player recorded a choice.
    Move {
        /// The player with the updated choice and timestamp.
        player: Player,
        /// Publication time.
        timestamp: i64,
    },

    /// A round was resolved.
    GameResult {
        /// Winner's name, `null` on draws.
        winner: Option<String>,
        /// Loser's name, `null` on draws.
        loser: Option<String>,
        /// Whether the round was drawn.
        is_draw: bool,
        /// Publication time.
        timestamp: i64,
    },

    /// Roster and last result were cleared.
    GameReset {
        /// Publication time.
        timestamp: i64,
    },
}

impl SessionEvent {
    /// Builds an `INITIAL_DATA` snapshot stamped with the current time.
    #[must_use]
    pub fn initial_data(players: Vec<Player>) -> Self {
        Self::InitialData {
            players,
            timestamp: now_millis(),
        }
    }

    /// Builds a `PLAYER_JOIN` event.
    #[must_use]
    pub fn player_join(player: Player) -> Self {
        Self::PlayerJoin {
            player,
            timestamp: now_millis(),
        }
    }

    /// Builds a `PLAYER_LEAVE` event.
    #[must_use]
    pub fn player_leave(player_id: PlayerId) -> Self {
        Self::PlayerLeave {
            player_id,
            timestamp: now_millis(),
        }
    }

    /// Builds a `MOVE` event.
    #[must_use]
    pub fn player_move(player: Player) -> Self {
        Self::Move {
            player,
            timestamp: now_millis(),
        }
    }

    /// Builds a `GAME_RESULT` event from a resolved outcome.
    #[must_use]
    pub fn game_result(outcome: RoundOutcome) -> Self {
        Self::GameResult {
            winner: outcome.winner,
            loser: outcome.loser,
            is_draw: outcome.is_draw,
            timestamp: now_millis(),
        }
    }

    /// Builds a `GAME_RESET` event.
    #[must_use]
    pub fn game_reset() -> Self {
        Self::GameReset {
            timestamp: now_millis(),
        }
    }

    /// Parses one wire message.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedEvent`] if the text is not valid
    /// JSON or does not match any event shape.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(|e| SessionError::MalformedEvent(e.to_string()))
    }

    /// Serializes the event to its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Internal`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string(self).map_err(|e| SessionError::Internal(e.to_string()))
    }

    /// Returns the wire `type` discriminator.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::InitialData { .. } => "INITIAL_DATA",
            Self::PlayerJoin { .. } => "PLAYER_JOIN",
            Self::PlayerLeave { .. } => "PLAYER_LEAVE",
            Self::Move { .. } => "MOVE",
            Self::GameResult { .. } => "GAME_RESULT",
            Self::GameReset { .. } => "GAME_RESET",
        }
    }

    /// Returns the publication timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        match self {
            Self::InitialData { timestamp, .. }
            | Self::PlayerJoin { timestamp, .. }
            | Self::PlayerLeave { timestamp, .. }
            | Self::Move { timestamp, .. }
            | Self::GameResult { timestamp, .. }
            | Self::GameReset { timestamp } => *timestamp,
        }
    }
}
