//! Error types for the tracking engine

use thiserror::Error;

/// Result type alias for the tracking engine
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Contract violations surfaced by the engine.
///
/// Geometric degeneracy and non-closing motion are not errors; they are
/// absorbed as sentinel values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Track {0} not found")]
    NotFound(u32),

    #[error("Track ids exhausted")]
    IdsExhausted,

    #[error("Top-down projection failed: {0}")]
    Projection(String),
}

impl TrackingError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn projection<S: Into<String>>(msg: S) -> Self {
        Self::Projection(msg.into())
    }
}
