//! [`GpuContext`] implementation on top of wgpu.
//!
//! Shader objects hold WGSL source and compile to a `wgpu::ShaderModule`
//! inside a validation error scope; the captured error text becomes the info
//! log. Linking builds a render pipeline from the vertex and fragment modules.
//! Texture parameters are stored per texture and turned into a
//! `wgpu::Sampler` on request. Texture units are emulated as binding slots so
//! a renderer can look up what was bound where.

use std::collections::HashMap;

use pollster::FutureExt;

use crate::context::{
    GpuContext, InternalFormat, MagFilter, MinFilter, PixelFormat, PixelType, ProgramId, ShaderId,
    ShaderStage, TexImage3d, TextureId, TextureParameter, TextureTarget, WrapMode,
};
use crate::error::{RenderError, RenderResult};

/// Settings for [`WgpuContext`].
#[derive(Debug, Clone)]
pub struct WgpuContextConfig {
    /// Entry point looked up in vertex shader modules.
    pub vertex_entry: String,
    /// Entry point looked up in fragment shader modules.
    pub fragment_entry: String,
    /// Color target format of linked programs.
    pub color_format: wgpu::TextureFormat,
}

impl Default for WgpuContextConfig {
    fn default() -> Self {
        Self {
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }
}

/// Sampling state recorded through `tex_parameter`. Defaults follow the
/// initial state of a freshly created GL texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    pub base_level: u32,
    pub max_level: u32,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    pub wrap_r: WrapMode,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            base_level: 0,
            max_level: 1000,
            min_filter: MinFilter::NearestMipmapLinear,
            mag_filter: MagFilter::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            wrap_r: WrapMode::Repeat,
        }
    }
}

impl SamplerState {
    fn apply(&mut self, parameter: TextureParameter) {
        match parameter {
            TextureParameter::BaseLevel(level) => self.base_level = level,
            TextureParameter::MaxLevel(level) => self.max_level = level,
            TextureParameter::MinFilter(filter) => self.min_filter = filter,
            TextureParameter::MagFilter(filter) => self.mag_filter = filter,
            TextureParameter::WrapS(mode) => self.wrap_s = mode,
            TextureParameter::WrapT(mode) => self.wrap_t = mode,
            TextureParameter::WrapR(mode) => self.wrap_r = mode,
        }
    }

    /// Builds the equivalent wgpu sampler descriptor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let (min_filter, mipmap_filter) = match self.min_filter {
            MinFilter::Nearest | MinFilter::NearestMipmapNearest => {
                (wgpu::FilterMode::Nearest, wgpu::FilterMode::Nearest)
            }
            MinFilter::Linear | MinFilter::LinearMipmapNearest => {
                (wgpu::FilterMode::Linear, wgpu::FilterMode::Nearest)
            }
            MinFilter::NearestMipmapLinear => (wgpu::FilterMode::Nearest, wgpu::FilterMode::Linear),
            MinFilter::LinearMipmapLinear => (wgpu::FilterMode::Linear, wgpu::FilterMode::Linear),
        };
        let mag_filter = match self.mag_filter {
            MagFilter::Nearest => wgpu::FilterMode::Nearest,
            MagFilter::Linear => wgpu::FilterMode::Linear,
        };

        wgpu::SamplerDescriptor {
            label: Some("volume sampler"),
            address_mode_u: address_mode(self.wrap_s),
            address_mode_v: address_mode(self.wrap_t),
            address_mode_w: address_mode(self.wrap_r),
            mag_filter,
            min_filter,
            mipmap_filter,
            lod_min_clamp: self.base_level as f32,
            lod_max_clamp: self.max_level.max(self.base_level) as f32,
            ..Default::default()
        }
    }
}

fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

struct ShaderObject {
    stage: ShaderStage,
    source: String,
    module: Option<wgpu::ShaderModule>,
    log: String,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<ShaderId>,
    pipeline: Option<wgpu::RenderPipeline>,
    log: String,
}

#[derive(Default)]
struct TextureObject {
    sampler: SamplerState,
    texture: Option<wgpu::Texture>,
}

/// A wgpu device wrapped as a stateful [`GpuContext`].
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: WgpuContextConfig,
    next_id: u32,
    shaders: HashMap<ShaderId, ShaderObject>,
    programs: HashMap<ProgramId, ProgramObject>,
    textures: HashMap<TextureId, TextureObject>,
    active_unit: u32,
    bindings: HashMap<(u32, TextureTarget), TextureId>,
    errors: Vec<String>,
}

impl WgpuContext {
    /// Wraps an existing device and queue.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, config: WgpuContextConfig) -> Self {
        Self {
            device,
            queue,
            config,
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            active_unit: 0,
            bindings: HashMap::new(),
            errors: Vec::new(),
        }
    }

    /// Creates a context on a new device without a surface.
    pub async fn new_headless(config: WgpuContextConfig) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("voxkit device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        log::info!(
            "created headless wgpu context on {}",
            adapter.get_info().name
        );
        Ok(Self::new(device, queue, config))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// The render pipeline of a linked program.
    pub fn pipeline(&self, program: &ProgramId) -> Option<&wgpu::RenderPipeline> {
        self.programs.get(program)?.pipeline.as_ref()
    }

    /// The texture bound to `target` on `unit`.
    pub fn bound_texture(&self, unit: u32, target: TextureTarget) -> Option<TextureId> {
        self.bindings.get(&(unit, target)).copied()
    }

    /// The sampling state recorded for a texture.
    pub fn sampler_state(&self, texture: &TextureId) -> Option<SamplerState> {
        Some(self.textures.get(texture)?.sampler)
    }

    /// Creates a sampler matching the texture's recorded parameters.
    pub fn sampler(&self, texture: &TextureId) -> Option<wgpu::Sampler> {
        let state = self.sampler_state(texture)?;
        Some(self.device.create_sampler(&state.descriptor()))
    }

    /// Creates a 3D view of an uploaded texture.
    pub fn texture_view(&self, texture: &TextureId) -> Option<wgpu::TextureView> {
        let texture = self.textures.get(texture)?.texture.as_ref()?;
        Some(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("volume texture view"),
            dimension: Some(wgpu::TextureViewDimension::D3),
            ..Default::default()
        }))
    }

    fn allocate(&mut self) -> Option<u32> {
        self.next_id = self.next_id.checked_add(1)?;
        Some(self.next_id)
    }

    fn bound(&mut self, target: TextureTarget) -> Option<TextureId> {
        let bound = self.bound_texture(self.active_unit, target);
        if bound.is_none() {
            let unit = self.active_unit;
            let error = format!("no texture bound to {target:?} on unit {unit}");
            self.errors.push(error);
        }
        bound
    }

    fn create_pipeline(
        &self,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
    ) -> Result<wgpu::RenderPipeline, String> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("voxkit program"),
                layout: None,
                vertex: wgpu::VertexState {
                    module: vertex,
                    entry_point: Some(self.config.vertex_entry.as_str()),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment,
                    entry_point: Some(self.config.fragment_entry.as_str()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        match self.device.pop_error_scope().block_on() {
            Some(error) => Err(error.to_string()),
            None => Ok(pipeline),
        }
    }

    fn upload_image(&self, image: &TexImage3d<'_>) -> Result<Option<wgpu::Texture>, String> {
        let (format, bytes_per_texel) = image_format(image);
        let Some(size) = image_extent(image)? else {
            log::debug!("volume texture has an empty extent; no storage allocated");
            return Ok(None);
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("volume texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D3,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Convert f32 -> f16 for upload
        let half_data: Vec<u16> = image
            .data
            .iter()
            .map(|&v| half::f16::from_f32(v).to_bits())
            .collect();

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&half_data),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * bytes_per_texel),
                rows_per_image: Some(image.height),
            },
            size,
        );

        match self.device.pop_error_scope().block_on() {
            Some(error) => Err(error.to_string()),
            None => Ok(Some(texture)),
        }
    }
}

fn image_format(image: &TexImage3d<'_>) -> (wgpu::TextureFormat, u32) {
    match (image.internal_format, image.format, image.ty) {
        (InternalFormat::R16F, PixelFormat::Red, PixelType::Float) => {
            (wgpu::TextureFormat::R16Float, 2)
        }
    }
}

/// Validates an image against its data and returns the extent to allocate.
///
/// A zero-sized image is valid but has no storage, so `None` is returned and
/// no wgpu texture is created for it.
fn image_extent(image: &TexImage3d<'_>) -> Result<Option<wgpu::Extent3d>, String> {
    if image.level != 0 {
        return Err(format!("mip level {} is not supported", image.level));
    }
    let expected = u64::from(image.width) * u64::from(image.height) * u64::from(image.depth);
    if expected != image.data.len() as u64 {
        return Err(format!(
            "image of {expected} texels given {} values",
            image.data.len()
        ));
    }
    if expected == 0 {
        return Ok(None);
    }
    Ok(Some(wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: image.depth,
    }))
}

impl GpuContext for WgpuContext {
    type Shader = ShaderId;
    type Program = ProgramId;
    type Texture = TextureId;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        let id = ShaderId(self.allocate()?);
        self.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                module: None,
                log: String::new(),
            },
        );
        Some(id)
    }

    fn shader_source(&mut self, shader: &ShaderId, source: &str) {
        match self.shaders.get_mut(shader) {
            Some(object) => object.source = source.to_string(),
            None => self.errors.push(format!("unknown shader {}", shader.0)),
        }
    }

    fn compile_shader(&mut self, shader: &ShaderId) {
        let Some(object) = self.shaders.get_mut(shader) else {
            self.errors.push(format!("unknown shader {}", shader.0));
            return;
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match object.stage {
                    ShaderStage::Vertex => "vertex shader",
                    ShaderStage::Fragment => "fragment shader",
                }),
                source: wgpu::ShaderSource::Wgsl(object.source.as_str().into()),
            });

        match self.device.pop_error_scope().block_on() {
            Some(error) => {
                object.module = None;
                object.log = error.to_string();
            }
            None => {
                object.module = Some(module);
                object.log.clear();
            }
        }
    }

    fn shader_compile_status(&self, shader: &ShaderId) -> bool {
        self.shaders
            .get(shader)
            .is_some_and(|object| object.module.is_some())
    }

    fn shader_info_log(&self, shader: &ShaderId) -> String {
        self.shaders
            .get(shader)
            .map(|object| object.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        let id = ProgramId(self.allocate()?);
        self.programs.insert(id, ProgramObject::default());
        Some(id)
    }

    fn attach_shader(&mut self, program: &ProgramId, shader: &ShaderId) {
        match self.programs.get_mut(program) {
            Some(object) => object.attached.push(*shader),
            None => self.errors.push(format!("unknown program {}", program.0)),
        }
    }

    fn link_program(&mut self, program: &ProgramId) {
        let Some(object) = self.programs.get(program) else {
            self.errors.push(format!("unknown program {}", program.0));
            return;
        };

        let stage = |stage: ShaderStage| {
            object
                .attached
                .iter()
                .filter_map(|id| self.shaders.get(id))
                .find(|shader| shader.stage == stage)
        };

        let outcome = match (stage(ShaderStage::Vertex), stage(ShaderStage::Fragment)) {
            (Some(vertex), Some(fragment)) => match (&vertex.module, &fragment.module) {
                (Some(vs), Some(fs)) => self.create_pipeline(vs, fs),
                _ => Err("attached shader is not compiled".to_string()),
            },
            (None, _) => Err("no vertex shader attached".to_string()),
            (_, None) => Err("no fragment shader attached".to_string()),
        };

        if let Some(object) = self.programs.get_mut(program) {
            match outcome {
                Ok(pipeline) => {
                    object.pipeline = Some(pipeline);
                    object.log.clear();
                }
                Err(log) => {
                    object.pipeline = None;
                    object.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: &ProgramId) -> bool {
        self.pipeline(program).is_some()
    }

    fn program_info_log(&self, program: &ProgramId) -> String {
        self.programs
            .get(program)
            .map(|object| object.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
    }

    fn create_texture(&mut self) -> Option<TextureId> {
        let id = TextureId(self.allocate()?);
        self.textures.insert(id, TextureObject::default());
        Some(id)
    }

    fn active_texture(&mut self, unit: u32) {
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<&TextureId>) {
        match texture {
            Some(id) if self.textures.contains_key(id) => {
                self.bindings.insert((self.active_unit, target), *id);
            }
            Some(id) => self.errors.push(format!("unknown texture {}", id.0)),
            None => {
                self.bindings.remove(&(self.active_unit, target));
            }
        }
    }

    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter) {
        let Some(id) = self.bound(target) else {
            return;
        };
        if let Some(object) = self.textures.get_mut(&id) {
            object.sampler.apply(parameter);
        }
    }

    fn tex_image_3d(&mut self, target: TextureTarget, image: &TexImage3d<'_>) {
        let Some(id) = self.bound(target) else {
            return;
        };
        match self.upload_image(image) {
            Ok(texture) => {
                if let Some(object) = self.textures.get_mut(&id) {
                    object.texture = texture;
                }
            }
            Err(error) => self.errors.push(error),
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(object) = self.textures.remove(&texture) {
            if let Some(texture) = object.texture {
                texture.destroy();
            }
        }
        self.bindings.retain(|_, bound| *bound != texture);
    }

    fn take_error(&mut self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.remove(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_defaults() {
        let state = SamplerState::default();
        let desc = state.descriptor();
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::Repeat);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn test_volume_parameters_map_to_sampler() {
        let mut state = SamplerState::default();
        for parameter in crate::texture::VOLUME_TEXTURE_PARAMETERS {
            state.apply(parameter);
        }
        let desc = state.descriptor();
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::Repeat);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert!(desc.lod_max_clamp.abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_level_below_base_is_clamped() {
        let state = SamplerState {
            base_level: 2,
            max_level: 0,
            ..SamplerState::default()
        };
        let desc = state.descriptor();
        assert!(desc.lod_max_clamp >= desc.lod_min_clamp);
    }

    fn image(dims: [u32; 3], data: &[f32]) -> TexImage3d<'_> {
        TexImage3d {
            level: 0,
            internal_format: InternalFormat::R16F,
            width: dims[0],
            height: dims[1],
            depth: dims[2],
            format: PixelFormat::Red,
            ty: PixelType::Float,
            data,
        }
    }

    #[test]
    fn test_empty_volume_allocates_nothing() {
        assert_eq!(image_extent(&image([0, 0, 0], &[])), Ok(None));
        assert_eq!(image_extent(&image([4, 0, 2], &[])), Ok(None));
    }

    #[test]
    fn test_image_extent() {
        let data = [0.0; 6];
        let extent = image_extent(&image([3, 2, 1], &data)).unwrap().unwrap();
        assert_eq!(extent.width, 3);
        assert_eq!(extent.height, 2);
        assert_eq!(extent.depth_or_array_layers, 1);
        assert!(image_extent(&image([3, 2, 2], &data)).is_err());
    }
}
