//! Session error types with HTTP status code mapping.
//!
//! [`SessionError`] is the central error type of the coordinator and the
//! HTTP surface. Each variant maps to a specific HTTP status code and a
//! structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::PlayerId;
use crate::store::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "session full: at most 2 players"
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`SessionError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Coordinator error enum with HTTP status code mapping.
///
/// `SessionFull` and the not-found variants are expected outcomes returned
/// to the immediate caller; none of these variants is ever fatal to the
/// process.
///
/// # Error Code Ranges
///
/// | Range     | Category            | HTTP Status                   |
/// |-----------|---------------------|-------------------------------|
/// | 1000–1999 | Validation          | 400 Bad Request               |
/// | 2000–2999 | Admission/Not Found | 409 Conflict / 404 Not Found  |
/// | 3000–3999 | Server/Store        | 500 / 503                     |
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The roster already holds the maximum number of players.
    #[error("session full: at most {capacity} players")]
    SessionFull {
        /// Roster capacity that was reached.
        capacity: usize,
    },

    /// No active player has the given id.
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    /// No statistics exist for the given name.
    #[error("no statistics for player {0:?}")]
    StatsNotFound(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The session store or event channel could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A message on the event stream could not be parsed.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MalformedEvent(_) => 1002,
            Self::SessionFull { .. } => 2001,
            Self::PlayerNotFound(_) => 2002,
            Self::StatsNotFound(_) => 2003,
            Self::Internal(_) => 3000,
            Self::StoreUnavailable(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MalformedEvent(_) => StatusCode::BAD_REQUEST,
            Self::SessionFull { .. } => StatusCode::CONFLICT,
            Self::PlayerNotFound(_) | Self::StatsNotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Corrupt(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
