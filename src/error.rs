//! Error types for the banner cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::CompositeKey;

// == Cache Error Enum ==
/// Unsuccessful cache lookups and invariant failures.
///
/// `Miss` and `Expired` are both "go to the backing store" for callers; the
/// distinction only tells whether the value was cold or stale.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key was never resident, or was already evicted or purged
    #[error("cache miss for key {0}")]
    Miss(CompositeKey),

    /// Key was resident but past its TTL; it has now been purged
    #[error("cache entry expired for key {0}")]
    Expired(CompositeKey),

    /// Internal bookkeeping disagrees with itself
    #[error("cache invariant violated: {0}")]
    InvariantViolation(String),
}

// == Config Error Enum ==
/// Rejected construction-time configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("eviction batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("eviction batch size {batch_size} exceeds capacity {capacity}")]
    BatchExceedsCapacity { batch_size: usize, capacity: usize },

    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },
}

// == Sink Error Enum ==
/// Eviction notification that could not be delivered.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    #[error("eviction sink is full")]
    Full,

    #[error("eviction sink is disconnected")]
    Disconnected,
}

// == Source Error Enum ==
/// Failures reported by the backing banner store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("no banner found")]
    NotFound,

    #[error("banner store error: {0}")]
    Backend(String),
}

// == Service Error Enum ==
/// Unified error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No banner matches the request
    #[error("Banner not found")]
    NotFound,

    /// Missing or unknown token
    #[error("Unauthorized")]
    Unauthorized,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backing store failed
    #[error("Banner store error: {0}")]
    Source(String),
}

impl From<SourceError> for ServiceError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound => ServiceError::NotFound,
            SourceError::Backend(msg) => ServiceError::Source(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ServiceError::Unauthorized => return StatusCode::UNAUTHORIZED.into_response(),
            ServiceError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::Source(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP surface.
pub type Result<T> = std::result::Result<T, ServiceError>;
