//! Volume texture upload.

use glam::UVec3;

use crate::context::{
    GpuContext, InternalFormat, MagFilter, MinFilter, PixelFormat, PixelType, TexImage3d,
    TextureParameter, TextureTarget, WrapMode,
};
use crate::error::{RenderError, RenderResult, ResourceKind};

/// Parameters applied to a volume texture before its image is uploaded.
///
/// Single mip level, trilinear minification, linear magnification, and edge
/// clamping on the two in-plane axes.
pub const VOLUME_TEXTURE_PARAMETERS: [TextureParameter; 6] = [
    TextureParameter::BaseLevel(0),
    TextureParameter::MaxLevel(0),
    TextureParameter::MinFilter(MinFilter::LinearMipmapLinear),
    TextureParameter::MagFilter(MagFilter::Linear),
    TextureParameter::WrapS(WrapMode::ClampToEdge),
    TextureParameter::WrapT(WrapMode::ClampToEdge),
];

/// Uploads normalized samples as a single-channel 3D float texture.
///
/// The texture is bound to `TEXTURE_3D` on `unit`, and that binding (and the
/// active unit) is left in place. Samples are laid out x fastest, then y,
/// then z. The GPU stores them as 16-bit floats.
///
/// A volume with a zero dimension uploads successfully. The wgpu context gives
/// such a texture no storage, so [`crate::WgpuContext::texture_view`] returns
/// `None` for it.
///
/// # Errors
///
/// - [`RenderError::DimensionMismatch`] if `dims` does not describe exactly
///   `samples.len()` voxels. No GPU call is made in that case.
/// - [`RenderError::ResourceCreation`] if no texture object can be created.
/// - [`RenderError::TextureUpload`] if the context rejects the upload. The
///   texture is deleted first.
pub fn upload_volume<C: GpuContext>(
    ctx: &mut C,
    dims: UVec3,
    samples: &[f32],
    unit: u32,
) -> RenderResult<C::Texture> {
    let expected = u64::from(dims.x) * u64::from(dims.y) * u64::from(dims.z);
    if expected != samples.len() as u64 {
        log::error!(
            "Volume {}x{}x{} does not match {} samples",
            dims.x,
            dims.y,
            dims.z,
            samples.len()
        );
        return Err(RenderError::DimensionMismatch {
            expected,
            actual: samples.len(),
        });
    }

    if let Some(stale) = ctx.take_error() {
        log::warn!("discarding stale GPU error before upload: {stale}");
        while ctx.take_error().is_some() {}
    }

    let Some(texture) = ctx.create_texture() else {
        log::error!("Failed to create volume texture");
        return Err(RenderError::ResourceCreation(ResourceKind::Texture));
    };

    ctx.active_texture(unit);
    ctx.bind_texture(TextureTarget::Texture3D, Some(&texture));
    for parameter in VOLUME_TEXTURE_PARAMETERS {
        ctx.tex_parameter(TextureTarget::Texture3D, parameter);
    }

    ctx.tex_image_3d(
        TextureTarget::Texture3D,
        &TexImage3d {
            level: 0,
            internal_format: InternalFormat::R16F,
            width: dims.x,
            height: dims.y,
            depth: dims.z,
            format: PixelFormat::Red,
            ty: PixelType::Float,
            data: samples,
        },
    );

    if let Some(error) = ctx.take_error() {
        log::error!("Failed to upload volume texture: {error}");
        ctx.bind_texture(TextureTarget::Texture3D, None);
        ctx.delete_texture(texture);
        return Err(RenderError::TextureUpload(error));
    }

    log::info!(
        "uploaded {}x{}x{} volume to texture unit {unit}",
        dims.x,
        dims.y,
        dims.z
    );
    Ok(texture)
}
