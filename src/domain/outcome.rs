//! Round resolution over the beats relation.
//!
//! [`resolve`] is a pure function of the players that moved. It never
//! touches the store; the coordinator feeds its result into stats updates
//! and the `GAME_RESULT` event.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Choice, Player};

/// Outcome of a round as published to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    /// Name of the winning player, absent on draws.
    pub winner: Option<String>,
    /// Name of the losing player, absent on draws.
    pub loser: Option<String>,
    /// Whether the round ended without a winner.
    pub is_draw: bool,
}

impl RoundOutcome {
    /// A draw; no winner or loser.
    #[must_use]
    pub const fn draw() -> Self {
        Self {
            winner: None,
            loser: None,
            is_draw: true,
        }
    }

    /// Not enough moves to decide anything.
    #[must_use]
    pub const fn undecided() -> Self {
        Self {
            winner: None,
            loser: None,
            is_draw: false,
        }
    }

    /// Returns `true` if the outcome names a winner and a loser.
    #[must_use]
    pub const fn is_decisive(&self) -> bool {
        !self.is_draw && self.winner.is_some() && self.loser.is_some()
    }
}

/// Resolves a round from the players that made a move.
///
/// Players without a choice are ignored. With fewer than two moves the
/// outcome is [`RoundOutcome::undecided`]. One distinct choice, or all
/// three, is a draw. With exactly two distinct choices the first player
/// found holding the dominating one wins and the first player found
/// holding the other loses.
#[must_use]
pub fn resolve(players: &[Player]) -> RoundOutcome {
    let moves: Vec<(&Player, Choice)> = players
        .iter()
        .filter_map(|p| p.choice.map(|c| (p, c)))
        .collect();

    if moves.len() < 2 {
        return RoundOutcome::undecided();
    }

    let mut distinct: Vec<Choice> = Vec::with_capacity(Choice::ALL.len());
    for (_, choice) in &moves {
        if !distinct.contains(choice) {
            distinct.push(*choice);
        }
    }

    let (first, second) = match distinct.as_slice() {
        [first, second] => (*first, *second),
        _ => return RoundOutcome::draw(),
    };

    let (winning, losing) = if first.defeats(second) {
        (first, second)
    } else {
        (second, first)
    };

    let holder = |wanted: Choice| {
        moves
            .iter()
            .find(|(_, choice)| *choice == wanted)
            .map(|(player, _)| player.name.clone())
    };

    RoundOutcome {
        winner: holder(winning),
        loser: holder(losing),
        is_draw: false,
    }
}
