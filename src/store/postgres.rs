//! PostgreSQL implementation of the session store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{SessionStore, StoreError};
use crate::config::ArenaConfig;
use crate::domain::{Choice, Player, PlayerId, PlayerStats};

type PlayerRow = (Uuid, String, Option<String>, i64);
type StatsRow = (String, i64, i64, i64, i64);

/// PostgreSQL-backed session store using `sqlx::PgPool`.
///
/// Each trait method issues a single statement, which gives the per-key
/// atomicity the coordinator relies on.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be reached.
    pub async fn connect(config: &ArenaConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(unavailable)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn to_db_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_db_count(value: i64, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {field}: {value}")))
}

fn player_from_row((id, name, choice, timestamp): PlayerRow) -> Result<Player, StoreError> {
    let choice = choice
        .map(|c| c.parse::<Choice>())
        .transpose()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(Player {
        id: PlayerId::from(id),
        name,
        choice,
        timestamp,
    })
}

fn stats_from_row((name, wins, losses, draws, total): StatsRow) -> Result<PlayerStats, StoreError> {
    Ok(PlayerStats {
        wins: from_db_count(wins, "wins")?,
        losses: from_db_count(losses, "losses")?,
        draws: from_db_count(draws, "draws")?,
        total_games: from_db_count(total, "total_games")?,
        name,
    })
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn put_player(&self, player: &Player) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO session_players (id, name, choice, timestamp_ms) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, choice = EXCLUDED.choice, \
             timestamp_ms = EXCLUDED.timestamp_ms",
        )
        .bind(player.id.into_uuid())
        .bind(&player.name)
        .bind(player.choice.map(Choice::as_str))
        .bind(player.timestamp)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, name, choice, timestamp_ms FROM session_players WHERE id = $1",
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.map(player_from_row).transpose()
    }

    async fn remove_player(&self, id: PlayerId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM session_players WHERE id = $1")
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(result.rows_affected() > 0)
    }

    async fn players(&self) -> Result<Vec<Player>, StoreError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, name, choice, timestamp_ms FROM session_players",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.into_iter().map(player_from_row).collect()
    }

    async fn clear_players(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session_players")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get_stats(&self, name: &str) -> Result<Option<PlayerStats>, StoreError> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT name, wins, losses, draws, total_games FROM player_stats WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        row.map(stats_from_row).transpose()
    }

    async fn put_stats(&self, stats: &PlayerStats) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO player_stats (name, wins, losses, draws, total_games) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (name) DO UPDATE SET wins = EXCLUDED.wins, losses = EXCLUDED.losses, \
             draws = EXCLUDED.draws, total_games = EXCLUDED.total_games",
        )
        .bind(&stats.name)
        .bind(to_db_count(stats.wins))
        .bind(to_db_count(stats.losses))
        .bind(to_db_count(stats.draws))
        .bind(to_db_count(stats.total_games))
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn set_rank(&self, name: &str, wins: u64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO player_ranking (name, wins) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET wins = EXCLUDED.wins",
        )
        .bind(name)
        .bind(to_db_count(wins))
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }

    async fn top_ranked(&self, limit: usize) -> Result<Vec<(String, u64)>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, wins FROM player_ranking ORDER BY wins DESC, name ASC LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        rows.into_iter()
            .map(|(name, wins)| Ok((name, from_db_count(wins, "wins")?)))
            .collect()
    }

    async fn clear_ranking(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM player_ranking")
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn decodes_player_row() {
        let id = Uuid::new_v4();
        let Ok(player) = player_from_row((id, "Alice".to_string(), Some("Rock".to_string()), 10))
        else {
            panic!("row rejected");
        };
        assert_eq!(player.id, PlayerId::from(id));
        assert_eq!(player.choice, Some(Choice::Rock));
    }

    #[test]
    fn rejects_unknown_choice_column() {
        let row = (Uuid::new_v4(), "Alice".to_string(), Some("Lizard".to_string()), 10);
        assert!(matches!(player_from_row(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn rejects_negative_counters() {
        let row = ("Bob".to_string(), 1, -1, 0, 0);
        assert!(matches!(stats_from_row(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn counters_saturate_into_bigint() {
        assert_eq!(to_db_count(u64::MAX), i64::MAX);
        assert_eq!(to_db_count(7), 7);
    }
}
