//! Session service: coordinates the shared roster and emits events.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    Choice, EventBus, GameResultKind, MAX_NAME_LEN, Player, PlayerId, PlayerStats, RoundOutcome,
    SessionEvent, resolve, sort_by_timestamp,
};
use crate::error::SessionError;
use crate::store::SessionStore;

/// Maximum number of players in the roster.
pub const MAX_PLAYERS: usize = 2;

/// Ranking size returned when the caller does not ask for one.
pub const DEFAULT_TOP_PLAYERS: usize = 5;

/// Upper bound on a ranking request.
pub const MAX_TOP_PLAYERS: usize = 50;

/// Coordination layer for the shared session.
///
/// Holds no session state of its own: the roster, stats, and ranking live
/// in the [`SessionStore`], and every mutation is announced on the
/// [`EventBus`]. Mutating operations follow the pattern: take the write
/// gate → read/modify the store → publish events → return result.
///
/// # Concurrency
///
/// The write gate serializes every mutating operation in this process, so
/// admission checks and stats read-modify-write sequences cannot
/// interleave. Events are published while the gate is held, which makes
/// bus order match mutation order. Reads (`list_active`, `top_players`,
/// `stats`) bypass the gate.
#[derive(Debug)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    event_bus: EventBus,
    write_gate: Mutex<()>,
}

impl SessionService {
    /// Creates a new `SessionService`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, event_bus: EventBus) -> Self {
        Self {
            store,
            event_bus,
            write_gate: Mutex::new(()),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`SessionStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Admits a new player to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRequest`] for an empty or overlong
    /// name, [`SessionError::SessionFull`] when the roster is at capacity,
    /// and [`SessionError::StoreUnavailable`] if the store fails.
    pub async fn join(&self, name: &str) -> Result<Player, SessionError> {
        let name = validate_name(name)?;
        let _gate = self.write_gate.lock().await;

        let roster = self.store.players().await?;
        if roster.len() >= MAX_PLAYERS {
            tracing::info!(name, active = roster.len(), "join rejected: session full");
            return Err(SessionError::SessionFull {
                capacity: MAX_PLAYERS,
            });
        }

        let player = Player::new(name);
        self.store.put_player(&player).await?;
        self.event_bus
            .publish(SessionEvent::player_join(player.clone()));

        tracing::info!(player_id = %player.id, name = %player.name, "player joined");
        Ok(player)
    }

    /// Records a player's choice and resolves the round once everyone moved.
    ///
    /// A `GAME_RESULT` event is published when at least two players have
    /// moved and no active player is still without a move.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PlayerNotFound`] if the id is not in the
    /// roster and [`SessionError::StoreUnavailable`] if the move cannot be
    /// stored.
    pub async fn record_move(
        &self,
        player_id: PlayerId,
        choice: Choice,
    ) -> Result<Player, SessionError> {
        let _gate = self.write_gate.lock().await;

        let mut player = self
            .store
            .get_player(player_id)
            .await?
            .ok_or(SessionError::PlayerNotFound(player_id))?;

        player.record_choice(choice);
        self.store.put_player(&player).await?;
        self.event_bus
            .publish(SessionEvent::player_move(player.clone()));
        tracing::info!(%player_id, name = %player.name, %choice, "move recorded");

        match self.store.players().await {
            Ok(mut roster) => {
                sort_by_timestamp(&mut roster);
                self.resolve_if_complete(&roster).await;
            }
            Err(err) => {
                tracing::warn!(%player_id, error = %err, "roster re-read failed; round left open");
            }
        }

        Ok(player)
    }

    /// Removes a player from the roster. Unknown ids are a no-op.
    ///
    /// A `PLAYER_LEAVE` event is published either way.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StoreUnavailable`] if the store fails.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), SessionError> {
        let _gate = self.write_gate.lock().await;

        let existed = self.store.remove_player(player_id).await?;
        self.event_bus.publish(SessionEvent::player_leave(player_id));

        tracing::info!(%player_id, existed, "player left");
        Ok(())
    }

    /// Clears the roster and the ranking index. Stats records are kept.
    ///
    /// Once the roster is cleared `GAME_RESET` is always published; a
    /// failure to clear the ranking afterwards is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StoreUnavailable`] if the roster cannot be
    /// cleared.
    pub async fn reset(&self) -> Result<(), SessionError> {
        let _gate = self.write_gate.lock().await;

        self.store.clear_players().await?;
        if let Err(err) = self.store.clear_ranking().await {
            tracing::warn!(error = %err, "failed to clear ranking; roster already reset");
        }
        self.event_bus.publish(SessionEvent::game_reset());

        tracing::info!("session reset");
        Ok(())
    }

    /// Returns the active players ordered by ascending timestamp.
    ///
    /// A store failure is logged and yields an empty roster.
    pub async fn list_active(&self) -> Vec<Player> {
        match self.store.players().await {
            Ok(mut players) => {
                sort_by_timestamp(&mut players);
                players
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read roster");
                Vec::new()
            }
        }
    }

    /// Returns up to `limit` stats records by descending wins.
    ///
    /// `limit` is clamped to `1..=MAX_TOP_PLAYERS`. Ranked names without a
    /// stats record are skipped. A store failure is logged and yields an
    /// empty ranking.
    pub async fn top_players(&self, limit: usize) -> Vec<PlayerStats> {
        let limit = limit.clamp(1, MAX_TOP_PLAYERS);
        let ranked = match self.store.top_ranked(limit).await {
            Ok(ranked) => ranked,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read ranking");
                return Vec::new();
            }
        };

        let mut top = Vec::with_capacity(ranked.len());
        for (name, _) in ranked {
            match self.store.get_stats(&name).await {
                Ok(Some(stats)) => top.push(stats),
                Ok(None) => tracing::debug!(name, "ranked name has no stats; skipped"),
                Err(err) => tracing::warn!(name, error = %err, "failed to read stats; skipped"),
            }
        }
        top
    }

    /// Returns the stats record of a name.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StatsNotFound`] if no round was ever recorded
    /// for the name and [`SessionError::StoreUnavailable`] if the store fails.
    pub async fn stats(&self, name: &str) -> Result<PlayerStats, SessionError> {
        self.store
            .get_stats(name)
            .await?
            .ok_or_else(|| SessionError::StatsNotFound(name.to_string()))
    }

    /// Counts one round for `name` and refreshes its ranking entry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StoreUnavailable`] if the store fails.
    pub async fn update_stats(
        &self,
        name: &str,
        result: GameResultKind,
    ) -> Result<PlayerStats, SessionError> {
        let _gate = self.write_gate.lock().await;
        self.apply_stats(name, result).await
    }

    /// Read-modify-write of one stats record. Caller holds the write gate.
    async fn apply_stats(
        &self,
        name: &str,
        result: GameResultKind,
    ) -> Result<PlayerStats, SessionError> {
        let mut stats = self
            .store
            .get_stats(name)
            .await?
            .unwrap_or_else(|| PlayerStats::empty(name));
        stats.record(result);

        self.store.put_stats(&stats).await?;
        self.store.set_rank(name, stats.wins).await?;

        tracing::debug!(name, %result, total = stats.total_games, "stats updated");
        Ok(stats)
    }

    /// Resolves and publishes the round if every active player has moved.
    /// Caller holds the write gate.
    async fn resolve_if_complete(&self, roster: &[Player]) {
        let moved: Vec<Player> = roster.iter().filter(|p| p.has_moved()).cloned().collect();
        if moved.len() < 2 || moved.len() != roster.len() {
            return;
        }

        let outcome = resolve(&moved);
        for (name, result) in stat_updates(&outcome) {
            if let Err(err) = self.apply_stats(name, result).await {
                tracing::warn!(name, %result, error = %err, "failed to record round stats");
            }
        }

        if outcome.is_draw {
            tracing::info!("round resolved: draw");
        } else {
            tracing::info!(
                winner = outcome.winner.as_deref().unwrap_or_default(),
                loser = outcome.loser.as_deref().unwrap_or_default(),
                "round resolved"
            );
        }
        self.event_bus.publish(SessionEvent::game_result(outcome));
    }
}

/// Stats increments implied by an outcome.
///
/// Only a decisive round names a winner and a loser; draws and undecided
/// outcomes leave every stats record and the ranking untouched.
fn stat_updates(outcome: &RoundOutcome) -> Vec<(&str, GameResultKind)> {
    match (&outcome.winner, &outcome.loser) {
        (Some(winner), Some(loser)) => vec![
            (winner.as_str(), GameResultKind::Win),
            (loser.as_str(), GameResultKind::Loss),
        ],
        _ => Vec::new(),
    }
}

/// Trims a display name and checks its length.
fn validate_name(raw: &str) -> Result<&str, SessionError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SessionError::InvalidRequest(
            "player name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SessionError::InvalidRequest(format!(
            "player name longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name)
}
