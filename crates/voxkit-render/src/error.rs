//! Rendering error types.

use std::fmt;

use thiserror::Error;

use crate::context::ShaderStage;

/// Kind of GPU object that failed to allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Shader(ShaderStage),
    Program,
    Texture,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shader(stage) => write!(f, "{stage} shader"),
            Self::Program => write!(f, "shader program"),
            Self::Texture => write!(f, "texture"),
        }
    }
}

/// Errors that can occur while building programs or uploading textures.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The context could not allocate an object.
    #[error("failed to create {0}")]
    ResourceCreation(ResourceKind),

    /// A program was built without one of its stages.
    #[error("missing {0} shader source")]
    MissingShaderSource(ShaderStage),

    /// Shader compilation failed.
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Program linking failed.
    #[error("shader program link failed: {0}")]
    ProgramLink(String),

    /// The declared volume size does not match the sample count.
    #[error("volume dimensions describe {expected} voxels, got {actual} samples")]
    DimensionMismatch { expected: u64, actual: usize },

    /// The image upload was rejected by the context.
    #[error("texture upload failed: {0}")]
    TextureUpload(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
