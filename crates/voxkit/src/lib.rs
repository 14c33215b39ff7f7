//! voxkit: GPU resource preparation for volume rendering.
//!
//! Two independent pipelines:
//! - [`init_shader_program`] compiles a vertex/fragment pair and links it
//! - [`load_volume_texture`] fetches a raw `i16` dataset, normalizes it by its
//!   maximum and uploads it as a single-channel 3D float texture
//!
//! # Example
//!
//! ```no_run
//! use voxkit::*;
//!
//! # async fn run() -> Result<()> {
//! init_logging();
//! let mut ctx = headless::create_context()?;
//! let program = init_shader_program(&mut ctx, RAYMARCH_VERTEX_WGSL, RAYMARCH_FRAGMENT_WGSL)?;
//! let volume = load_volume_texture(
//!     &HttpFetcher::new(),
//!     "http://localhost:8080/head.raw",
//!     &mut ctx,
//!     &LoaderOptions::default(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod fetch;
pub mod headless;
pub mod pipeline;

pub use error::{Result, VoxkitError};
pub use fetch::{
    Fetch, FetchRequest, FileFetcher, HttpFetcher, Method, ResponseKind, TransportError,
};
pub use pipeline::{
    fetch_dataset, init_shader_program, load_volume_texture, prepare_volume, upload_prepared,
    PreparedVolume, VolumeTexture,
};

pub use voxkit_core::{
    encode_dataset, normalize, parse_header, ByteOrder, LoaderOptions, NormalizedVolume,
    ScalePolicy, UVec3, VolumeError, VolumeHeader,
};
pub use voxkit_render::{
    GpuContext, RecordingContext, RenderError, ShaderProgram, ShaderStage, WgpuContext,
    WgpuContextConfig, RAYMARCH_FRAGMENT_WGSL, RAYMARCH_VERTEX_WGSL,
};

/// Installs `env_logger` as the log backend, filtered by `RUST_LOG`.
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
