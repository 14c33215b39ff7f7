//! In-memory [`GpuContext`] that records every call.
//!
//! Useful for exercising the pipelines without a GPU. Compilation fails for
//! any source containing an `#error` directive, object creation can be made
//! to fail, and live objects are tracked so leaks show up in assertions.

use std::collections::{HashMap, HashSet};

use crate::context::{
    GpuContext, InternalFormat, PixelFormat, PixelType, ProgramId, ShaderId, ShaderStage,
    TexImage3d, TextureId, TextureParameter, TextureTarget,
};

const NO_TEXTURE_BOUND: &str = "INVALID_OPERATION: no texture bound";

/// A recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    ShaderSource(ShaderId),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram,
    AttachShader(ProgramId, ShaderId),
    LinkProgram(ProgramId),
    DeleteProgram(ProgramId),
    CreateTexture,
    ActiveTexture(u32),
    BindTexture(TextureTarget, Option<TextureId>),
    TexParameter(TextureTarget, TextureParameter),
    TexImage3d {
        target: TextureTarget,
        level: u32,
        internal_format: InternalFormat,
        dims: [u32; 3],
        format: PixelFormat,
        ty: PixelType,
        data: Vec<f32>,
    },
    DeleteTexture(TextureId),
}

#[derive(Debug)]
struct ShaderEntry {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramEntry {
    attached: Vec<ShaderId>,
    linked: bool,
    log: String,
}

/// Recording context with configurable failures.
#[derive(Debug, Default)]
pub struct RecordingContext {
    /// Refuse to allocate shader objects.
    pub fail_shader_creation: bool,
    /// Refuse to allocate program objects.
    pub fail_program_creation: bool,
    /// Refuse to allocate texture objects.
    pub fail_texture_creation: bool,
    /// Fail every link with this log.
    pub link_failure: Option<String>,
    /// Latch this error on the next image upload.
    pub upload_failure: Option<String>,

    calls: Vec<Call>,
    next_id: u32,
    shaders: HashMap<ShaderId, ShaderEntry>,
    programs: HashMap<ProgramId, ProgramEntry>,
    textures: HashSet<TextureId>,
    active_unit: u32,
    bindings: HashMap<(u32, TextureTarget), TextureId>,
    errors: Vec<String>,
}

impl RecordingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Shader objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Program objects created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Texture objects created and not yet deleted.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// Texture bound to `target` on `unit`.
    pub fn binding(&self, unit: u32, target: TextureTarget) -> Option<TextureId> {
        self.bindings.get(&(unit, target)).copied()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn bound(&self, target: TextureTarget) -> Option<TextureId> {
        self.binding(self.active_unit, target)
    }
}

fn compile_source(source: &str) -> Result<(), String> {
    for (index, line) in source.lines().enumerate() {
        if let Some(message) = line.trim_start().strip_prefix("#error") {
            return Err(format!(
                "ERROR: 0:{}: '#error' : {}",
                index + 1,
                message.trim()
            ));
        }
    }
    if source.trim().is_empty() {
        return Err("ERROR: 0:0: '' : empty shader source".to_string());
    }
    Ok(())
}

impl GpuContext for RecordingContext {
    type Shader = ShaderId;
    type Program = ProgramId;
    type Texture = TextureId;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderId> {
        self.calls.push(Call::CreateShader(stage));
        if self.fail_shader_creation {
            return None;
        }
        let id = ShaderId(self.next());
        self.shaders.insert(
            id,
            ShaderEntry {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Some(id)
    }

    fn shader_source(&mut self, shader: &ShaderId, source: &str) {
        self.calls.push(Call::ShaderSource(*shader));
        if let Some(entry) = self.shaders.get_mut(shader) {
            entry.source = source.to_string();
        }
    }

    fn compile_shader(&mut self, shader: &ShaderId) {
        self.calls.push(Call::CompileShader(*shader));
        if let Some(entry) = self.shaders.get_mut(shader) {
            match compile_source(&entry.source) {
                Ok(()) => {
                    entry.compiled = true;
                    entry.log.clear();
                }
                Err(log) => {
                    entry.compiled = false;
                    entry.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: &ShaderId) -> bool {
        self.shaders.get(shader).is_some_and(|e| e.compiled)
    }

    fn shader_info_log(&self, shader: &ShaderId) -> String {
        self.shaders
            .get(shader)
            .map(|e| e.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.calls.push(Call::DeleteShader(shader));
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> Option<ProgramId> {
        self.calls.push(Call::CreateProgram);
        if self.fail_program_creation {
            return None;
        }
        let id = ProgramId(self.next());
        self.programs.insert(id, ProgramEntry::default());
        Some(id)
    }

    fn attach_shader(&mut self, program: &ProgramId, shader: &ShaderId) {
        self.calls.push(Call::AttachShader(*program, *shader));
        if let Some(entry) = self.programs.get_mut(program) {
            entry.attached.push(*shader);
        }
    }

    fn link_program(&mut self, program: &ProgramId) {
        self.calls.push(Call::LinkProgram(*program));
        let stages: Vec<(ShaderStage, bool)> = match self.programs.get(program) {
            Some(entry) => entry
                .attached
                .iter()
                .filter_map(|id| self.shaders.get(id).map(|s| (s.stage, s.compiled)))
                .collect(),
            None => return,
        };

        let result = if let Some(log) = &self.link_failure {
            Err(log.clone())
        } else if stages.iter().any(|(_, compiled)| !compiled) {
            Err("ERROR: one or more attached shaders not successfully compiled".to_string())
        } else if !stages.iter().any(|(s, _)| *s == ShaderStage::Vertex) {
            Err("ERROR: no vertex shader attached".to_string())
        } else if !stages.iter().any(|(s, _)| *s == ShaderStage::Fragment) {
            Err("ERROR: no fragment shader attached".to_string())
        } else {
            Ok(())
        };

        if let Some(entry) = self.programs.get_mut(program) {
            match result {
                Ok(()) => {
                    entry.linked = true;
                    entry.log.clear();
                }
                Err(log) => {
                    entry.linked = false;
                    entry.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: &ProgramId) -> bool {
        self.programs.get(program).is_some_and(|e| e.linked)
    }

    fn program_info_log(&self, program: &ProgramId) -> String {
        self.programs
            .get(program)
            .map(|e| e.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(Call::DeleteProgram(program));
        self.programs.remove(&program);
    }

    fn create_texture(&mut self) -> Option<TextureId> {
        self.calls.push(Call::CreateTexture);
        if self.fail_texture_creation {
            return None;
        }
        let id = TextureId(self.next());
        self.textures.insert(id);
        Some(id)
    }

    fn active_texture(&mut self, unit: u32) {
        self.calls.push(Call::ActiveTexture(unit));
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, target: TextureTarget, texture: Option<&TextureId>) {
        self.calls.push(Call::BindTexture(target, texture.copied()));
        match texture {
            Some(id) => {
                self.bindings.insert((self.active_unit, target), *id);
            }
            None => {
                self.bindings.remove(&(self.active_unit, target));
            }
        }
    }

    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter) {
        self.calls.push(Call::TexParameter(target, parameter));
        if self.bound(target).is_none() {
            self.errors.push(NO_TEXTURE_BOUND.to_string());
        }
    }

    fn tex_image_3d(&mut self, target: TextureTarget, image: &TexImage3d<'_>) {
        self.calls.push(Call::TexImage3d {
            target,
            level: image.level,
            internal_format: image.internal_format,
            dims: [image.width, image.height, image.depth],
            format: image.format,
            ty: image.ty,
            data: image.data.to_vec(),
        });
        if self.bound(target).is_none() {
            self.errors.push(NO_TEXTURE_BOUND.to_string());
        }
        if let Some(error) = self.upload_failure.take() {
            self.errors.push(error);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::DeleteTexture(texture));
        self.textures.remove(&texture);
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
