//! The two preparation pipelines.
//!
//! Program building and volume loading are independent; both mutate the GPU
//! context, so the caller decides their order. The program must be linked
//! before any draw call uses it.

use voxkit_core::{
    normalize_with_policy, parse_header, LoaderOptions, NormalizedVolume, VolumeHeader,
};
use voxkit_render::{upload_volume, GpuContext, ShaderBuilder, ShaderProgram};

use crate::error::Result;
use crate::fetch::{Fetch, FetchRequest};

/// Compiles a vertex/fragment pair and links them into a program.
pub fn init_shader_program<C: GpuContext>(
    ctx: &mut C,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ShaderProgram<C::Program>> {
    let program = ShaderBuilder::new()
        .with_vertex(vertex_source)
        .with_fragment(fragment_source)
        .build(ctx)?;
    Ok(program)
}

/// A decoded and normalized dataset, ready for upload.
#[derive(Debug, Clone)]
pub struct PreparedVolume {
    pub header: VolumeHeader,
    pub volume: NormalizedVolume,
}

/// A volume texture living on the GPU.
#[derive(Debug)]
pub struct VolumeTexture<T> {
    /// The texture object, bound to `TEXTURE_3D` on the configured unit.
    pub texture: T,
    /// Dimensions the dataset declared.
    pub header: VolumeHeader,
    /// Divisor applied during normalization.
    pub scale: f32,
}

/// Decodes and normalizes a raw dataset on the host.
pub fn prepare_volume(bytes: &[u8], options: &LoaderOptions) -> Result<PreparedVolume> {
    let raw = parse_header(bytes, options.byte_order)?;
    log::info!(
        "volume is {}x{}x{}",
        raw.header.width(),
        raw.header.height(),
        raw.header.depth()
    );

    let volume = normalize_with_policy(&raw.samples, options.scale_policy)?;
    Ok(PreparedVolume {
        header: raw.header,
        volume,
    })
}

/// Uploads a prepared volume to the configured texture unit.
pub fn upload_prepared<C: GpuContext>(
    ctx: &mut C,
    prepared: &PreparedVolume,
    options: &LoaderOptions,
) -> Result<VolumeTexture<C::Texture>> {
    let texture = upload_volume(
        ctx,
        prepared.header.dims,
        &prepared.volume.samples,
        options.texture_unit,
    )?;
    Ok(VolumeTexture {
        texture,
        header: prepared.header,
        scale: prepared.volume.scale,
    })
}

/// Fetches a dataset and returns its bytes.
pub async fn fetch_dataset<F: Fetch>(fetcher: &F, url: &str) -> Result<Vec<u8>> {
    log::debug!("fetching volume from {url}");
    match fetcher.fetch(&FetchRequest::get(url)).await {
        Ok(bytes) => {
            log::debug!("fetched {} bytes from {url}", bytes.len());
            Ok(bytes)
        }
        Err(err) => {
            log::error!("Could not load volume from {url}; ensure the dataset is present: {err}");
            Err(err.into())
        }
    }
}

/// Fetches, decodes, normalizes and uploads a volume.
///
/// The fetch is the only suspension point. Everything after it runs
/// synchronously against `ctx`.
pub async fn load_volume_texture<F: Fetch, C: GpuContext>(
    fetcher: &F,
    url: &str,
    ctx: &mut C,
    options: &LoaderOptions,
) -> Result<VolumeTexture<C::Texture>> {
    let bytes = fetch_dataset(fetcher, url).await?;
    let prepared = prepare_volume(&bytes, options)?;
    upload_prepared(ctx, &prepared, options)
}
