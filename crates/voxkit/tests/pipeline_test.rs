//! End-to-end tests of the volume and shader pipelines against the recording
//! context.

use std::collections::HashMap;
use std::future::Future;

use tempfile::TempDir;

use voxkit::*;
use voxkit_render::{Call, InternalFormat, PixelFormat, PixelType, TextureTarget};

/// Serves datasets from memory, answering 404 for unknown URLs.
#[derive(Default)]
struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    fn with(url: &str, bytes: Vec<u8>) -> Self {
        let mut files = HashMap::new();
        files.insert(url.to_string(), bytes);
        Self { files }
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = std::result::Result<Vec<u8>, TransportError>> + Send {
        let result = self
            .files
            .get(&request.url)
            .cloned()
            .ok_or_else(|| TransportError::new(404, "Not Found"));
        std::future::ready(result)
    }
}

fn dataset(dims: (u32, u32, u32), samples: &[i16]) -> Vec<u8> {
    encode_dataset(
        &VolumeHeader::new(dims.0, dims.1, dims.2),
        samples,
        ByteOrder::LittleEndian,
    )
}

#[test]
fn test_end_to_end_2x2x1() {
    let fetcher = MemoryFetcher::with("volume.raw", dataset((2, 2, 1), &[4, 8, 2, 6]));
    let mut ctx = RecordingContext::new();

    let volume = pollster::block_on(load_volume_texture(
        &fetcher,
        "volume.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap();

    assert_eq!(volume.header, VolumeHeader::new(2, 2, 1));
    assert_eq!(volume.scale, 8.0);

    let uploads: Vec<&Call> = ctx
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::TexImage3d { .. }))
        .collect();
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        *uploads[0],
        Call::TexImage3d {
            target: TextureTarget::Texture3D,
            level: 0,
            internal_format: InternalFormat::R16F,
            dims: [2, 2, 1],
            format: PixelFormat::Red,
            ty: PixelType::Float,
            data: vec![0.5, 1.0, 0.25, 0.75],
        }
    );
    assert_eq!(
        ctx.binding(0, TextureTarget::Texture3D),
        Some(volume.texture)
    );
}

#[test]
fn test_transport_error_propagates() {
    let fetcher = MemoryFetcher::default();
    let mut ctx = RecordingContext::new();

    let err = pollster::block_on(load_volume_texture(
        &fetcher,
        "missing.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap_err();

    match err {
        VoxkitError::Transport(t) => {
            assert_eq!(t.status, 404);
            assert_eq!(t.status_text, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ctx.calls().is_empty());
}

#[test]
fn test_malformed_header_stops_before_gpu() {
    let fetcher = MemoryFetcher::with("short.raw", vec![2, 0, 2]);
    let mut ctx = RecordingContext::new();

    let err = pollster::block_on(load_volume_texture(
        &fetcher,
        "short.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap_err();

    assert!(matches!(
        err,
        VoxkitError::Volume(VolumeError::MalformedHeader(_))
    ));
    assert!(ctx.calls().is_empty());
}

#[test]
fn test_declared_size_mismatch() {
    // Header claims 2x2x2 but only four samples follow.
    let fetcher = MemoryFetcher::with("bad.raw", dataset((2, 2, 2), &[1, 2, 3, 4]));
    let mut ctx = RecordingContext::new();

    let err = pollster::block_on(load_volume_texture(
        &fetcher,
        "bad.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap_err();

    assert!(matches!(
        err,
        VoxkitError::Render(RenderError::DimensionMismatch {
            expected: 8,
            actual: 4
        })
    ));
    assert_eq!(ctx.count(|c| matches!(c, Call::TexImage3d { .. })), 0);
    assert_eq!(ctx.live_textures(), 0);
}

#[test]
fn test_all_negative_volume_uploads_non_finite_samples() {
    let fetcher = MemoryFetcher::with("neg.raw", dataset((3, 1, 1), &[-5, -3, -1]));
    let mut ctx = RecordingContext::new();

    let volume = pollster::block_on(load_volume_texture(
        &fetcher,
        "neg.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap();
    assert_eq!(volume.scale, 0.0);

    let data = ctx
        .calls()
        .iter()
        .find_map(|c| match c {
            Call::TexImage3d { data, .. } => Some(data.clone()),
            _ => None,
        })
        .unwrap();
    assert!(data.iter().all(|v| v.is_infinite() && *v < 0.0));
}

#[test]
fn test_custom_texture_unit_and_byte_order() {
    let bytes = encode_dataset(&VolumeHeader::new(1, 1, 2), &[1, 2], ByteOrder::BigEndian);
    let fetcher = MemoryFetcher::with("be.raw", bytes);
    let mut ctx = RecordingContext::new();
    let options = LoaderOptions {
        byte_order: ByteOrder::BigEndian,
        texture_unit: 4,
        ..LoaderOptions::default()
    };

    let volume =
        pollster::block_on(load_volume_texture(&fetcher, "be.raw", &mut ctx, &options)).unwrap();
    assert_eq!(volume.header, VolumeHeader::new(1, 1, 2));
    assert_eq!(ctx.active_unit(), 4);
    assert_eq!(
        ctx.binding(4, TextureTarget::Texture3D),
        Some(volume.texture)
    );
}

#[test]
fn test_file_fetcher_pipeline() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("cube.raw"), dataset((2, 1, 1), &[3, 6])).unwrap();

    let fetcher = FileFetcher::with_root(dir.path());
    let mut ctx = RecordingContext::new();
    let volume = pollster::block_on(load_volume_texture(
        &fetcher,
        "cube.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap();
    assert_eq!(volume.scale, 6.0);
}

#[test]
fn test_shader_and_volume_pipelines_are_independent() {
    let fetcher = MemoryFetcher::with("v.raw", dataset((1, 1, 1), &[7]));
    let mut ctx = RecordingContext::new();

    let program = init_shader_program(&mut ctx, "void main() {}", "void main() {}").unwrap();
    let volume = pollster::block_on(load_volume_texture(
        &fetcher,
        "v.raw",
        &mut ctx,
        &LoaderOptions::default(),
    ))
    .unwrap();

    assert_ne!(program.program.0, volume.texture.0);
    assert_eq!(ctx.live_programs(), 1);
    assert_eq!(ctx.live_textures(), 1);
    assert_eq!(ctx.live_shaders(), 0);
}

#[test]
fn test_link_failure_returns_no_program() {
    let mut ctx = RecordingContext::new();
    ctx.link_failure = Some("ERROR: fragment input not written by vertex stage".to_string());

    let err = init_shader_program(&mut ctx, "void main() {}", "void main() {}").unwrap_err();
    match err {
        VoxkitError::Render(RenderError::ProgramLink(log)) => {
            assert!(log.contains("not written"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ctx.live_programs(), 0);
    assert_eq!(ctx.live_shaders(), 0);
}

#[tokio::test]
async fn test_http_fetcher_connection_refused() {
    let fetcher = HttpFetcher::new();
    let err = fetcher
        .fetch(&FetchRequest::get("http://127.0.0.1:1/volume.raw"))
        .await
        .unwrap_err();
    assert_eq!(err.status, 0);
    assert!(!err.status_text.is_empty());
}
