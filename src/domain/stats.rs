//! Durable per-name aggregate statistics.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of one round from a single player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameResultKind {
    /// The player held the dominating choice.
    Win,
    /// The player held the dominated choice.
    Loss,
    /// The round was a draw.
    Draw,
}

impl fmt::Display for GameResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
        })
    }
}

/// Aggregate counters keyed by display name, so they outlive a session.
///
/// `total_games` always equals `wins + losses + draws` when the record is
/// only mutated through [`PlayerStats::record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    /// Display name the counters belong to.
    pub name: String,
    /// Rounds won.
    pub wins: u64,
    /// Rounds lost.
    pub losses: u64,
    /// Rounds drawn.
    pub draws: u64,
    /// Rounds played.
    pub total_games: u64,
}

impl PlayerStats {
    /// Zero baseline for a name with no recorded rounds.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wins: 0,
            losses: 0,
            draws: 0,
            total_games: 0,
        }
    }

    /// Counts one more round with the given result.
    pub fn record(&mut self, result: GameResultKind) {
        self.total_games = self.total_games.saturating_add(1);
        let counter = match result {
            GameResultKind::Win => &mut self.wins,
            GameResultKind::Loss => &mut self.losses,
            GameResultKind::Draw => &mut self.draws,
        };
        *counter = counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_win_from_zero() {
        let mut stats = PlayerStats::empty("Alice");
        stats.record(GameResultKind::Win);
        assert_eq!(
            (stats.wins, stats.losses, stats.draws, stats.total_games),
            (1, 0, 0, 1)
        );
    }

    #[test]
    fn one_of_each() {
        let mut stats = PlayerStats::empty("Alice");
        stats.record(GameResultKind::Win);
        stats.record(GameResultKind::Loss);
        stats.record(GameResultKind::Draw);
        assert_eq!(
            (stats.wins, stats.losses, stats.draws, stats.total_games),
            (1, 1, 1, 3)
        );
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(PlayerStats::empty("Bob")).unwrap_or_default();
        assert!(json.get("totalGames").is_some());
        assert_eq!(
            serde_json::to_string(&GameResultKind::Loss).ok().as_deref(),
            Some("\"loss\"")
        );
    }
}
