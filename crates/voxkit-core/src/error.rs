//! Error types for volume handling.

use thiserror::Error;

/// Errors that can occur while decoding or normalizing a volume dataset.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// The buffer cannot hold a valid `(width, height, depth)` header.
    #[error("malformed volume header: {0}")]
    MalformedHeader(String),

    /// The normalization scale is not positive and the policy forbids it.
    #[error("normalization scale {0} is not positive")]
    NonPositiveScale(f32),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for volume operations.
pub type Result<T> = std::result::Result<T, VolumeError>;
