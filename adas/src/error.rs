//! Error types for the collision warning driver

use thiserror::Error;
use ttctrack::TrackingError;

/// Result type alias for the driver
pub type Result<T> = std::result::Result<T, AdasError>;

#[derive(Error, Debug)]
pub enum AdasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),
}

impl AdasError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_record<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::InvalidRecord {
            line,
            message: msg.into(),
        }
    }
}
