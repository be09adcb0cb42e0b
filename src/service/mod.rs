//! Service layer: session coordination.
//!
//! [`SessionService`] runs admission control, move recording, round
//! resolution, and statistics updates against the session store, and
//! emits events through the [`super::domain::EventBus`].

pub mod session_service;

pub use session_service::{DEFAULT_TOP_PLAYERS, MAX_PLAYERS, MAX_TOP_PLAYERS, SessionService};
