//! Domain layer: players, statistics, round resolution, and events.
//!
//! This module contains the session data model, the pure outcome
//! resolution over the beats relation, the closed event protocol, and the
//! event bus that broadcasts session changes to every relay.

pub mod event_bus;
pub mod outcome;
pub mod player;
pub mod player_id;
pub mod session_event;
pub mod stats;

pub use event_bus::EventBus;
pub use outcome::{RoundOutcome, resolve};
pub use player::{Choice, MAX_NAME_LEN, Player, UnknownChoice, now_millis, sort_by_timestamp};
pub use player_id::PlayerId;
pub use session_event::SessionEvent;
pub use stats::{GameResultKind, PlayerStats};
