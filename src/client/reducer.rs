//! Client-side reducer over session events.

use crate::domain::{Player, PlayerId, RoundOutcome, SessionEvent};
use crate::service::MAX_PLAYERS;

/// Local view of the session reconstructed from the event stream.
///
/// Every transition is idempotent against duplicate delivery, so the
/// subscribe-then-snapshot race of the relay is harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    players: Vec<Player>,
    last_result: Option<RoundOutcome>,
    ranking_stale: bool,
}

impl SessionView {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Players in the order the stream introduced them.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up one player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Outcome of the most recent round, cleared on reset.
    #[must_use]
    pub const fn last_result(&self) -> Option<&RoundOutcome> {
        self.last_result.as_ref()
    }

    /// Returns `true` when the roster is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Returns `true` once, after a round resolved, so the ranking can be
    /// fetched again.
    pub fn take_ranking_refresh(&mut self) -> bool {
        std::mem::take(&mut self.ranking_stale)
    }

    /// Folds one event into the view.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::InitialData { players, .. } => {
                self.players.clone_from(players);
            }
            SessionEvent::PlayerJoin { player, .. } => {
                if self.player(player.id).is_none() {
                    self.players.push(player.clone());
                }
            }
            SessionEvent::PlayerLeave { player_id, .. } => {
                self.players.retain(|p| p.id != *player_id);
            }
            SessionEvent::Move { player, .. } => {
                if let Some(existing) = self.players.iter_mut().find(|p| p.id == player.id) {
                    existing.choice = player.choice;
                    existing.timestamp = player.timestamp;
                }
            }
            SessionEvent::GameResult {
                winner,
                loser,
                is_draw,
                ..
            } => {
                self.last_result = Some(RoundOutcome {
                    winner: winner.clone(),
                    loser: loser.clone(),
                    is_draw: *is_draw,
                });
                self.ranking_stale = true;
            }
            SessionEvent::GameReset { .. } => {
                self.players.clear();
                self.last_result = None;
            }
        }
    }

    /// Parses one wire message and folds it into the view.
    ///
    /// Malformed messages are logged and dropped without touching the
    /// state; returns whether the message was applied.
    pub fn apply_message(&mut self, raw: &str) -> bool {
        match SessionEvent::from_json(raw) {
            Ok(event) => {
                self.apply(&event);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "dropping malformed session event");
                false
            }
        }
    }
}
