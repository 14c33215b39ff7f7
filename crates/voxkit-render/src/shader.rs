//! Shader compilation and program linking.

use crate::context::{GpuContext, ShaderStage};
use crate::error::{RenderError, RenderResult, ResourceKind};

/// A successfully compiled shader stage.
///
/// The object is released when passed to [`link_program`], whatever the link
/// outcome, or explicitly through [`CompiledShader::release`].
#[must_use = "compiled shaders hold a GPU object until linked or released"]
#[derive(Debug)]
pub struct CompiledShader<S> {
    stage: ShaderStage,
    handle: S,
}

impl<S> CompiledShader<S> {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> &S {
        &self.handle
    }

    /// Deletes the shader object without linking it.
    pub fn release<C: GpuContext<Shader = S>>(self, ctx: &mut C) {
        ctx.delete_shader(self.handle);
    }
}

/// A linked shader program.
#[derive(Debug)]
pub struct ShaderProgram<P> {
    /// The program object.
    pub program: P,
    /// Label used in log messages.
    pub label: Option<String>,
}

/// Compiles a single shader stage.
///
/// On failure the shader object is deleted and no handle escapes.
pub fn compile_shader<C: GpuContext>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> RenderResult<CompiledShader<C::Shader>> {
    let Some(shader) = ctx.create_shader(stage) else {
        log::error!("Failed to create {stage} shader");
        return Err(RenderError::ResourceCreation(ResourceKind::Shader(stage)));
    };

    ctx.shader_source(&shader, source);
    ctx.compile_shader(&shader);

    if !ctx.shader_compile_status(&shader) {
        let log = ctx.shader_info_log(&shader);
        log::error!("An error occurred compiling the {stage} shader: {log}");
        ctx.delete_shader(shader);
        return Err(RenderError::ShaderCompile { stage, log });
    }

    log::debug!("compiled {stage} shader");
    Ok(CompiledShader {
        stage,
        handle: shader,
    })
}

/// Attaches both stages to a new program and links it.
///
/// Both shader objects are released on every path. A program that fails to
/// link is deleted before the error is returned.
pub fn link_program<C: GpuContext>(
    ctx: &mut C,
    vertex: CompiledShader<C::Shader>,
    fragment: CompiledShader<C::Shader>,
) -> RenderResult<C::Program> {
    debug_assert_eq!(vertex.stage, ShaderStage::Vertex);
    debug_assert_eq!(fragment.stage, ShaderStage::Fragment);

    let result = attach_and_link(ctx, &vertex.handle, &fragment.handle);
    vertex.release(ctx);
    fragment.release(ctx);
    result
}

fn attach_and_link<C: GpuContext>(
    ctx: &mut C,
    vertex: &C::Shader,
    fragment: &C::Shader,
) -> RenderResult<C::Program> {
    let Some(program) = ctx.create_program() else {
        log::error!("Failed to create shader program");
        return Err(RenderError::ResourceCreation(ResourceKind::Program));
    };

    ctx.attach_shader(&program, vertex);
    ctx.attach_shader(&program, fragment);
    ctx.link_program(&program);

    if !ctx.program_link_status(&program) {
        let log = ctx.program_info_log(&program);
        log::error!("Unable to initialize the shader program: {log}");
        ctx.delete_program(program);
        return Err(RenderError::ProgramLink(log));
    }

    Ok(program)
}

/// Builder for creating shader programs.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            label: None,
        }
    }

    /// Sets the vertex shader source.
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source.
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Sets the program label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Compiles both stages and links them into a program.
    ///
    /// If the fragment stage fails to compile, the already compiled vertex
    /// stage is released before returning.
    pub fn build<C: GpuContext>(self, ctx: &mut C) -> RenderResult<ShaderProgram<C::Program>> {
        let vertex_source = self
            .vertex_source
            .as_deref()
            .ok_or_else(|| missing_source(ShaderStage::Vertex))?;
        let fragment_source = self
            .fragment_source
            .as_deref()
            .ok_or_else(|| missing_source(ShaderStage::Fragment))?;

        let vertex = compile_shader(ctx, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_shader(ctx, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                vertex.release(ctx);
                return Err(err);
            }
        };

        let program = link_program(ctx, vertex, fragment)?;
        log::info!(
            "linked shader program '{}'",
            self.label.as_deref().unwrap_or("unnamed")
        );

        Ok(ShaderProgram {
            program,
            label: self.label,
        })
    }
}

fn missing_source(stage: ShaderStage) -> RenderError {
    log::error!("Unable to build the shader program: no {stage} shader source");
    RenderError::MissingShaderSource(stage)
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Call, RecordingContext};

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() { color = vec4(1.0); }";

    #[test]
    fn test_compile_success() {
        let mut ctx = RecordingContext::new();
        let shader = compile_shader(&mut ctx, ShaderStage::Vertex, VS).unwrap();
        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert_eq!(ctx.live_shaders(), 1);
        shader.release(&mut ctx);
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_compile_failure_releases_shader() {
        let mut ctx = RecordingContext::new();
        let err = compile_shader(&mut ctx, ShaderStage::Fragment, "#error missing semicolon")
            .unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.count(|c| matches!(c, Call::DeleteShader(_))), 1);
    }

    #[test]
    fn test_shader_creation_failure() {
        let mut ctx = RecordingContext::new();
        ctx.fail_shader_creation = true;
        let err = compile_shader(&mut ctx, ShaderStage::Vertex, VS).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ResourceCreation(ResourceKind::Shader(ShaderStage::Vertex))
        ));
        assert_eq!(ctx.count(|c| matches!(c, Call::CompileShader(_))), 0);
    }

    #[test]
    fn test_build_program() {
        let mut ctx = RecordingContext::new();
        let program = ShaderBuilder::new()
            .with_vertex(VS)
            .with_fragment(FS)
            .with_label("volume")
            .build(&mut ctx)
            .unwrap();
        assert_eq!(program.label.as_deref(), Some("volume"));
        assert_eq!(ctx.live_programs(), 1);
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.count(|c| matches!(c, Call::AttachShader(..))), 2);
    }

    #[test]
    fn test_fragment_failure_releases_vertex() {
        let mut ctx = RecordingContext::new();
        let err = ShaderBuilder::new()
            .with_vertex(VS)
            .with_fragment("#error bad")
            .build(&mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.count(|c| matches!(c, Call::CreateProgram)), 0);
    }

    #[test]
    fn test_link_failure_releases_everything() {
        let mut ctx = RecordingContext::new();
        ctx.link_failure = Some("ERROR: varying mismatch".to_string());
        let err = ShaderBuilder::new()
            .with_vertex(VS)
            .with_fragment(FS)
            .build(&mut ctx)
            .unwrap_err();
        match err {
            RenderError::ProgramLink(log) => assert!(log.contains("varying mismatch")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_programs(), 0);
    }

    #[test]
    fn test_program_creation_failure_releases_shaders() {
        let mut ctx = RecordingContext::new();
        ctx.fail_program_creation = true;
        let err = ShaderBuilder::new()
            .with_vertex(VS)
            .with_fragment(FS)
            .build(&mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ResourceCreation(ResourceKind::Program)
        ));
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_missing_source() {
        let mut ctx = RecordingContext::new();
        let err = ShaderBuilder::new()
            .with_vertex(VS)
            .build(&mut ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingShaderSource(ShaderStage::Fragment)
        ));
        assert!(ctx.calls().is_empty());
    }
}
