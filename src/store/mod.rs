//! Session store: roster, per-name statistics, and the ranking index.
//!
//! [`SessionStore`] is the storage contract the coordinator runs against.
//! Every method is atomic on its own; sequences of calls are not, so the
//! coordinator serializes its multi-step operations itself.
//!
//! Two backends are provided: [`MemoryStore`] for single-process
//! deployments and tests, and [`PostgresStore`] backed by `sqlx::PgPool`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Player, PlayerId, PlayerStats};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Failure of a single store call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be reached or rejected the call.
    #[error("{0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Storage contract for the shared session.
///
/// Holds three logical structures: the roster (player id → [`Player`]),
/// stats records (name → [`PlayerStats`]), and a ranking index
/// (name → wins) ordered for top-N queries.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Inserts or overwrites a roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    async fn put_player(&self, player: &Player) -> Result<(), StoreError>;

    /// Reads one roster entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails and
    /// [`StoreError::Corrupt`] if the entry cannot be decoded.
    async fn get_player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;

    /// Removes a roster entry. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the delete fails.
    async fn remove_player(&self, id: PlayerId) -> Result<bool, StoreError>;

    /// Reads the full roster in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails and
    /// [`StoreError::Corrupt`] if an entry cannot be decoded.
    async fn players(&self) -> Result<Vec<Player>, StoreError>;

    /// Empties the roster.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the delete fails.
    async fn clear_players(&self) -> Result<(), StoreError>;

    /// Reads the stats record for a name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails and
    /// [`StoreError::Corrupt`] if the record cannot be decoded.
    async fn get_stats(&self, name: &str) -> Result<Option<PlayerStats>, StoreError>;

    /// Writes a full stats record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    async fn put_stats(&self, stats: &PlayerStats) -> Result<(), StoreError>;

    /// Sets the ranking score of a name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    async fn set_rank(&self, name: &str, wins: u64) -> Result<(), StoreError>;

    /// Returns up to `limit` `(name, wins)` pairs by descending wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails and
    /// [`StoreError::Corrupt`] if a stored score is negative.
    async fn top_ranked(&self, limit: usize) -> Result<Vec<(String, u64)>, StoreError>;

    /// Empties the ranking index. Stats records are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the delete fails.
    async fn clear_ranking(&self) -> Result<(), StoreError>;
}
