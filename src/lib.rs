//! # rps-arena
//!
//! Real-time coordination service for a single shared rock-paper-scissors
//! session.
//!
//! At most two players are active at once. Every state change is published
//! as a [`domain::SessionEvent`] on an in-process bus, and each connected
//! client is served by a relay that first sends a snapshot of the roster
//! and then forwards live events over WebSocket or Server-Sent Events.
//! Clients fold the stream into a [`client::SessionView`].
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket, SSE)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── Relay (relay/) ── ws / sse transports
//!     │
//!     ├── SessionService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     └── SessionStore (store/) ── memory | PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod relay;
pub mod service;
pub mod store;
