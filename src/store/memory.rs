//! In-process session store.
//!
//! [`MemoryStore`] keeps each logical structure behind its own
//! [`tokio::sync::RwLock`], so reads of the roster run concurrently with
//! each other and a stats write never blocks a roster read.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StoreError};
use crate::domain::{Player, PlayerId, PlayerStats};

/// Ordered name → wins index.
///
/// The `BTreeSet` keeps entries sorted by descending wins and then by name,
/// and the `HashMap` finds the current entry of a name so it can be moved
/// when the score changes.
#[derive(Debug, Default)]
struct RankingIndex {
    scores: HashMap<String, u64>,
    ordered: BTreeSet<(Reverse<u64>, String)>,
}

impl RankingIndex {
    fn set(&mut self, name: &str, wins: u64) {
        if let Some(old) = self.scores.insert(name.to_string(), wins) {
            self.ordered.remove(&(Reverse(old), name.to_string()));
        }
        self.ordered.insert((Reverse(wins), name.to_string()));
    }

    fn top(&self, limit: usize) -> Vec<(String, u64)> {
        self.ordered
            .iter()
            .take(limit)
            .map(|(Reverse(wins), name)| (name.clone(), *wins))
            .collect()
    }

    fn clear(&mut self) {
        self.scores.clear();
        self.ordered.clear();
    }
}

/// Session store living in process memory.
///
/// Nothing survives a restart. Used when persistence is disabled and by
/// the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<PlayerId, Player>>,
    stats: RwLock<HashMap<String, PlayerStats>>,
    ranking: RwLock<RankingIndex>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn put_player(&self, player: &Player) -> Result<(), StoreError> {
        self.players.write().await.insert(player.id, player.clone());
        Ok(())
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.players.read().await.get(&id).cloned())
    }

    async fn remove_player(&self, id: PlayerId) -> Result<bool, StoreError> {
        Ok(self.players.write().await.remove(&id).is_some())
    }

    async fn players(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.players.read().await.values().cloned().collect())
    }

    async fn clear_players(&self) -> Result<(), StoreError> {
        self.players.write().await.clear();
        Ok(())
    }

    async fn get_stats(&self, name: &str) -> Result<Option<PlayerStats>, StoreError> {
        Ok(self.stats.read().await.get(name).cloned())
    }

    async fn put_stats(&self, stats: &PlayerStats) -> Result<(), StoreError> {
        self.stats
            .write()
            .await
            .insert(stats.name.clone(), stats.clone());
        Ok(())
    }

    async fn set_rank(&self, name: &str, wins: u64) -> Result<(), StoreError> {
        self.ranking.write().await.set(name, wins);
        Ok(())
    }

    async fn top_ranked(&self, limit: usize) -> Result<Vec<(String, u64)>, StoreError> {
        Ok(self.ranking.read().await.top(limit))
    }

    async fn clear_ranking(&self) -> Result<(), StoreError> {
        self.ranking.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Choice;

    #[tokio::test]
    async fn put_and_get_player() {
        let store = MemoryStore::new();
        let player = Player::new("Alice");

        assert!(store.put_player(&player).await.is_ok());

        let Ok(Some(fetched)) = store.get_player(player.id).await else {
            panic!("player missing");
        };
        assert_eq!(fetched, player);
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let store = MemoryStore::new();
        let mut player = Player::new("Alice");
        let _ = store.put_player(&player).await;

        player.choice = Some(Choice::Rock);
        let _ = store.put_player(&player).await;

        let players = store.players().await.unwrap_or_default();
        assert_eq!(players.len(), 1);
        assert!(players.iter().all(|p| p.choice == Some(Choice::Rock)));
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let store = MemoryStore::new();
        let player = Player::new("Alice");
        let _ = store.put_player(&player).await;

        assert!(matches!(store.remove_player(player.id).await, Ok(true)));
        assert!(matches!(store.remove_player(player.id).await, Ok(false)));
    }

    #[tokio::test]
    async fn clear_players_keeps_stats() {
        let store = MemoryStore::new();
        let _ = store.put_player(&Player::new("Alice")).await;
        let _ = store.put_stats(&PlayerStats::empty("Alice")).await;

        let _ = store.clear_players().await;

        assert!(store.players().await.unwrap_or_default().is_empty());
        assert!(matches!(store.get_stats("Alice").await, Ok(Some(_))));
    }

    #[tokio::test]
    async fn ranking_orders_by_wins_then_name() {
        let store = MemoryStore::new();
        let _ = store.set_rank("carol", 1).await;
        let _ = store.set_rank("alice", 3).await;
        let _ = store.set_rank("bob", 3).await;
        let _ = store.set_rank("dave", 2).await;

        let top = store.top_ranked(3).await.unwrap_or_default();
        assert_eq!(
            top,
            vec![
                ("alice".to_string(), 3),
                ("bob".to_string(), 3),
                ("dave".to_string(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn set_rank_moves_existing_entry() {
        let store = MemoryStore::new();
        let _ = store.set_rank("alice", 1).await;
        let _ = store.set_rank("bob", 2).await;
        let _ = store.set_rank("alice", 5).await;

        let top = store.top_ranked(10).await.unwrap_or_default();
        assert_eq!(top.len(), 2);
        assert_eq!(top.first().map(|(n, w)| (n.as_str(), *w)), Some(("alice", 5)));
    }

    #[tokio::test]
    async fn clear_ranking_empties_index() {
        let store = MemoryStore::new();
        let _ = store.set_rank("alice", 1).await;
        let _ = store.clear_ranking().await;
        assert!(store.top_ranked(5).await.unwrap_or_default().is_empty());
    }
}
