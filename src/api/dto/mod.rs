//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire, matching the event protocol.

pub mod game_dto;

pub use game_dto::*;
