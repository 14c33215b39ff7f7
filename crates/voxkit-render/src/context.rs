//! The GPU capability surface used by the shader and texture pipelines.
//!
//! [`GpuContext`] models a stateful graphics API: objects are created and
//! named by handles, compile/link results are queried after the fact, and
//! textures are configured through whatever is currently bound to the active
//! texture unit. Every operation takes the context explicitly; none of the
//! pipelines restore binding state on return.

use std::fmt;

/// One half of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Binding target for texture objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture3D,
}

/// Minification filter, including the mipmap selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

/// Magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// A single texture parameter assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParameter {
    BaseLevel(u32),
    MaxLevel(u32),
    MinFilter(MinFilter),
    MagFilter(MagFilter),
    WrapS(WrapMode),
    WrapT(WrapMode),
    WrapR(WrapMode),
}

/// Storage format of texels on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalFormat {
    /// Single red channel, 16-bit float.
    R16F,
}

/// Channel layout of the host-side pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
}

/// Component representation of the host-side pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Float,
}

/// Arguments of a 3D image upload.
#[derive(Debug, Clone, Copy)]
pub struct TexImage3d<'a> {
    pub level: u32,
    pub internal_format: InternalFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub format: PixelFormat,
    pub ty: PixelType,
    pub data: &'a [f32],
}

/// Handle of a shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u32);

/// Handle of a program object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

/// Handle of a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// A stateful GPU context.
///
/// `create_*` return `None` when the context cannot allocate another object.
/// Errors raised by state-changing calls are latched and reported by
/// [`GpuContext::take_error`].
pub trait GpuContext {
    type Shader;
    type Program;
    type Texture;

    fn create_shader(&mut self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&mut self, shader: &Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: &Self::Shader);
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    fn create_program(&mut self) -> Option<Self::Program>;
    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&mut self, program: &Self::Program);
    fn program_link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    fn delete_program(&mut self, program: Self::Program);

    fn create_texture(&mut self) -> Option<Self::Texture>;
    /// Selects the texture unit later bind calls apply to.
    fn active_texture(&mut self, unit: u32);
    /// Binds `texture` to `target` on the active unit, or unbinds with `None`.
    fn bind_texture(&mut self, target: TextureTarget, texture: Option<&Self::Texture>);
    /// Sets a parameter on the texture bound to `target` on the active unit.
    fn tex_parameter(&mut self, target: TextureTarget, parameter: TextureParameter);
    /// Uploads an image into the texture bound to `target` on the active unit.
    fn tex_image_3d(&mut self, target: TextureTarget, image: &TexImage3d<'_>);
    fn delete_texture(&mut self, texture: Self::Texture);

    /// Returns and clears the oldest latched error.
    fn take_error(&mut self) -> Option<String>;
}
