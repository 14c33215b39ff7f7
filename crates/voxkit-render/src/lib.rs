//! GPU resource preparation for voxkit.
//!
//! This crate provides:
//! - The [`GpuContext`] capability surface and its wgpu implementation
//! - Shader compilation and program linking with diagnostics
//! - 3D volume texture upload
//! - A recording context for exercising the pipelines without a GPU

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod context;
pub mod error;
pub mod recording;
pub mod shader;
pub mod shaders;
pub mod texture;
pub mod wgpu_context;

pub use context::{
    GpuContext, InternalFormat, MagFilter, MinFilter, PixelFormat, PixelType, ProgramId,
    ShaderId, ShaderStage, TexImage3d, TextureId, TextureParameter, TextureTarget, WrapMode,
};
pub use error::{RenderError, RenderResult, ResourceKind};
pub use recording::{Call, RecordingContext};
pub use shader::{compile_shader, link_program, CompiledShader, ShaderBuilder, ShaderProgram};
pub use shaders::{RAYMARCH_FRAGMENT_WGSL, RAYMARCH_VERTEX_WGSL};
pub use texture::{upload_volume, VOLUME_TEXTURE_PARAMETERS};
pub use wgpu_context::{SamplerState, WgpuContext, WgpuContextConfig};
