//! Error types for voxkit.

use thiserror::Error;

use crate::fetch::TransportError;

/// The main error type for voxkit operations.
#[derive(Error, Debug)]
pub enum VoxkitError {
    /// Fetching the dataset failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Decoding or normalizing the dataset failed.
    #[error("volume error: {0}")]
    Volume(#[from] voxkit_core::VolumeError),

    /// Building a program or uploading a texture failed.
    #[error("render error: {0}")]
    Render(#[from] voxkit_render::RenderError),
}

/// A specialized Result type for voxkit operations.
pub type Result<T> = std::result::Result<T, VoxkitError>;
