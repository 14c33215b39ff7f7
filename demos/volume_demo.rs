//! Volume preparation demo.
//!
//! Builds the raymarch program on a headless device and loads a volume into
//! texture unit 0. Pass a URL or file path to load a dataset, or run without
//! arguments to generate a small sphere.
//!
//! Run with: cargo run --example volume_demo -- [URL|PATH]

use voxkit::*;

/// A `size`^3 volume whose samples fall off with distance from the center.
fn sphere_dataset(size: u32) -> Vec<u8> {
    let center = (size as f32 - 1.0) / 2.0;
    let mut samples = Vec::with_capacity((size * size * size) as usize);
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let d = ((x as f32 - center).powi(2)
                    + (y as f32 - center).powi(2)
                    + (z as f32 - center).powi(2))
                .sqrt();
                samples.push((1000.0 * (1.0 - d / center)).max(0.0) as i16);
            }
        }
    }
    encode_dataset(
        &VolumeHeader::new(size, size, size),
        &samples,
        ByteOrder::LittleEndian,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let mut ctx = headless::create_context()?;
    let program = init_shader_program(&mut ctx, RAYMARCH_VERTEX_WGSL, RAYMARCH_FRAGMENT_WGSL)?;
    println!("linked program {:?}", program.program);

    let options = LoaderOptions::default();
    let volume = match std::env::args().nth(1) {
        Some(source) if source.starts_with("http://") || source.starts_with("https://") => {
            load_volume_texture(&HttpFetcher::new(), &source, &mut ctx, &options).await?
        }
        Some(source) => {
            load_volume_texture(&FileFetcher::new(), &source, &mut ctx, &options).await?
        }
        None => {
            let prepared = prepare_volume(&sphere_dataset(32), &options)?;
            upload_prepared(&mut ctx, &prepared, &options)?
        }
    };

    println!(
        "uploaded {}x{}x{} volume (scale {}) as {:?}",
        volume.header.width(),
        volume.header.height(),
        volume.header.depth(),
        volume.scale,
        volume.texture
    );
    Ok(())
}
