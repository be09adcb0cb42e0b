//! Player tokens.
//!
//! A [`PlayerId`] is the bearer token a client receives from join and
//! sends back with every move and leave. It is a random UUID v4 so it
//! carries no join time or ordering a client could guess from; ordering
//! lives in the player's `timestamp` instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Token identifying one roster entry for as long as the player stays.
///
/// Serialized as the bare hyphenated UUID string, both in HTTP bodies
/// (`playerId`) and in `PLAYER_LEAVE` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PlayerId(uuid::Uuid);

impl PlayerId {
    /// Draws a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The UUID column value used by the Postgres store.
    #[must_use]
    pub const fn into_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Accepts the hyphenated form with surrounding whitespace; anything else,
/// including tokens in other formats, is rejected.
impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<uuid::Uuid> for PlayerId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}
