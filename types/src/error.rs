//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for value-level validation.
#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("{0}")]
    Other(String),
}
