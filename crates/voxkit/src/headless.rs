//! Headless GPU context creation.
//!
//! Creates a wgpu device without a window so programs and textures can be
//! prepared in tools, tests and batch jobs.

use pollster::FutureExt;
use voxkit_render::{WgpuContext, WgpuContextConfig};

use crate::Result;

/// Creates a headless context with the default entry points and color format.
///
/// # Example
/// ```no_run
/// use voxkit::*;
///
/// let mut ctx = headless::create_context().unwrap();
/// let program = init_shader_program(&mut ctx, RAYMARCH_VERTEX_WGSL, RAYMARCH_FRAGMENT_WGSL).unwrap();
/// assert!(ctx.pipeline(&program.program).is_some());
/// ```
pub fn create_context() -> Result<WgpuContext> {
    create_context_with(WgpuContextConfig::default())
}

/// Creates a headless context with custom settings.
pub fn create_context_with(config: WgpuContextConfig) -> Result<WgpuContext> {
    let context = WgpuContext::new_headless(config).block_on()?;
    Ok(context)
}
