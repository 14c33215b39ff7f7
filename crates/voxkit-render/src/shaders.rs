//! Built-in WGSL sources for drawing an uploaded volume.
//!
//! The fragment stage expects the volume view at `@group(0) @binding(0)` and
//! its sampler at `@binding(1)`.

/// Fullscreen-triangle vertex stage (`vs_main`).
pub const RAYMARCH_VERTEX_WGSL: &str = include_str!("../shaders/raymarch_vertex.wgsl");

/// Volume compositing fragment stage (`fs_main`).
pub const RAYMARCH_FRAGMENT_WGSL: &str = include_str!("../shaders/raymarch_fragment.wgsl");
