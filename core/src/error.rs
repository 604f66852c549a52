//! Error types for the marketplace client core.
//!
//! # Design
//! `ValidationError` belongs to the normalizer: one malformed record, one
//! human-readable reason. `ApiError` is what every `parse_*` method and the
//! favorite coordinator return. `NotFound` keeps its own variant because
//! callers distinguish "the listing is gone" from other failures; every other
//! non-2xx response lands in `Http` with the message extracted from the body.

use thiserror::Error;

/// A raw listing record could not be turned into a `Listing`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid listing: {reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors returned by `MarketClient` parse methods and the favorite
/// coordinator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("{message}")]
    NotFound { message: String },

    /// The server returned a non-2xx status other than 404.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The host could not complete the round-trip at all.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A business rule rejected the operation before any request was built.
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
