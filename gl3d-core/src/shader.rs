/// Shader compilation and program lifecycle.
///
/// Sources are fetched through a [`ResourceSource`], compiled per stage and
/// linked into a [`ShaderProgram`]. Program state moves
/// `Created -> Attached -> Linked -> InUse`; once the program is in use the
/// stage objects are detached and the link result stays with the program.
use std::fmt;

use crate::error::ShaderError;
use crate::gpu::GpuContext;
use crate::math::{Mat3, Mat4, Vec2, Vec3};
use crate::resource::ResourceSource;

/// Suffix of resources that hold GLSL shared by several stages.
pub const GENERAL_SHADER_SUFFIX: &str = ".glsl";

/// Pipeline stage a shader object is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Resource name marker for this stage.
    pub fn suffix(self) -> &'static str {
        match self {
            ShaderStage::Vertex => ".vert",
            ShaderStage::Fragment => ".frag",
        }
    }

    /// Stage whose marker appears in `resource`, vertex first.
    pub fn of_resource(resource: &str) -> Option<Self> {
        [ShaderStage::Vertex, ShaderStage::Fragment]
            .into_iter()
            .find(|stage| resource.contains(stage.suffix()))
    }

    /// Resource name for `base` in this stage.
    pub fn resource_name(self, base: &str) -> String {
        format!("{}{}", base, self.suffix())
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// True when `resource` carries any shader marker.
pub fn is_shader_resource(resource: &str) -> bool {
    ShaderStage::of_resource(resource).is_some() || resource.contains(GENERAL_SHADER_SUFFIX)
}

/// Checks that the resources are given in vertex, fragment order.
pub fn check_shader_resources(vertex: &str, fragment: &str) -> Result<(), ShaderError> {
    if !vertex.contains(ShaderStage::Vertex.suffix()) {
        return Err(ShaderError::StageMismatch {
            expected: ShaderStage::Vertex,
            resource: vertex.to_string(),
        });
    }
    if !fragment.contains(ShaderStage::Fragment.suffix()) {
        return Err(ShaderError::StageMismatch {
            expected: ShaderStage::Fragment,
            resource: fragment.to_string(),
        });
    }
    Ok(())
}

/// Fetches the text of a shader resource.
pub fn shader_resource<R: ResourceSource + ?Sized>(
    resources: &R,
    name: &str,
) -> Result<String, ShaderError> {
    if !is_shader_resource(name) {
        return Err(ShaderError::NotAShader(name.to_string()));
    }
    let source = resources.fetch_text(name)?;
    log::debug!("Loaded shader resource {} ({} bytes)", name, source.len());
    Ok(source)
}

/// A successfully compiled shader object.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledShader<S> {
    pub stage: ShaderStage,
    pub handle: S,
}

/// Creates, sources and compiles one shader object.
///
/// On failure the diagnostic log is captured and the object is deleted.
pub fn compile_shader<C: GpuContext>(
    ctx: &C,
    stage: ShaderStage,
    source: &str,
) -> Result<CompiledShader<C::Shader>, ShaderError> {
    let shader = ctx
        .create_shader(stage)
        .ok_or(ShaderError::ShaderCreationFailed(stage))?;
    ctx.shader_source(&shader, source);
    ctx.compile_shader(&shader);

    if !ctx.compile_status(&shader) {
        let log = ctx.shader_info_log(&shader).unwrap_or_default();
        log::warn!("{} shader failed to compile: {}", stage, log);
        ctx.delete_shader(&shader);
        return Err(ShaderError::CompileFailed { stage, log });
    }

    log::debug!("Compiled {} shader", stage);
    Ok(CompiledShader {
        stage,
        handle: shader,
    })
}

/// A compiled vertex and fragment shader.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderPair<S> {
    pub vertex: CompiledShader<S>,
    pub fragment: CompiledShader<S>,
}

impl<S> ShaderPair<S> {
    /// Deletes both shader objects.
    pub fn release<C: GpuContext<Shader = S>>(self, ctx: &C) {
        ctx.delete_shader(&self.vertex.handle);
        ctx.delete_shader(&self.fragment.handle);
    }

    fn handles(&self) -> [&S; 2] {
        [&self.vertex.handle, &self.fragment.handle]
    }
}

/// Loads and compiles the named vertex and fragment resources.
///
/// The names are checked before anything is fetched or created. If the
/// fragment stage fails, the already compiled vertex shader is deleted.
pub fn load_shaders<C, R>(
    ctx: &C,
    resources: &R,
    vertex: &str,
    fragment: &str,
) -> Result<ShaderPair<C::Shader>, ShaderError>
where
    C: GpuContext,
    R: ResourceSource + ?Sized,
{
    check_shader_resources(vertex, fragment)?;
    let vertex_source = shader_resource(resources, vertex)?;
    let fragment_source = shader_resource(resources, fragment)?;

    let vertex = compile_shader(ctx, ShaderStage::Vertex, &vertex_source)?;
    let fragment = match compile_shader(ctx, ShaderStage::Fragment, &fragment_source) {
        Ok(fragment) => fragment,
        Err(err) => {
            ctx.delete_shader(&vertex.handle);
            return Err(err);
        }
    };
    Ok(ShaderPair { vertex, fragment })
}

/// Loads `<name>.vert` and `<name>.frag`.
pub fn load_shaders_by_name<C, R>(
    ctx: &C,
    resources: &R,
    name: &str,
) -> Result<ShaderPair<C::Shader>, ShaderError>
where
    C: GpuContext,
    R: ResourceSource + ?Sized,
{
    load_shaders(
        ctx,
        resources,
        &ShaderStage::Vertex.resource_name(name),
        &ShaderStage::Fragment.resource_name(name),
    )
}

/// Lifecycle state of a [`ShaderProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Created,
    Attached,
    Linked,
    InUse,
}

/// A program object and the shaders currently attached to it.
pub struct ShaderProgram<C: GpuContext> {
    handle: C::Program,
    attached: Vec<C::Shader>,
    state: ProgramState,
}

impl<C: GpuContext> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("attached", &self.attached)
            .field("state", &self.state)
            .finish()
    }
}

impl<C: GpuContext> ShaderProgram<C> {
    pub fn create(ctx: &C) -> Result<Self, ShaderError> {
        let handle = ctx
            .create_program()
            .ok_or(ShaderError::ProgramCreationFailed)?;
        Ok(Self {
            handle,
            attached: Vec::new(),
            state: ProgramState::Created,
        })
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn handle(&self) -> &C::Program {
        &self.handle
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.state, ProgramState::Linked | ProgramState::InUse)
    }

    pub fn attach(&mut self, ctx: &C, shader: &CompiledShader<C::Shader>) {
        ctx.attach_shader(&self.handle, &shader.handle);
        self.attached.push(shader.handle.clone());
        if self.state == ProgramState::Created {
            self.state = ProgramState::Attached;
        }
    }

    pub fn link(&mut self, ctx: &C) -> Result<(), ShaderError> {
        ctx.link_program(&self.handle);
        if !ctx.link_status(&self.handle) {
            let log = ctx.program_info_log(&self.handle).unwrap_or_default();
            log::warn!("Program failed to link: {}", log);
            return Err(ShaderError::LinkFailed { log });
        }
        log::debug!("Linked program {:?}", self.handle);
        self.state = ProgramState::Linked;
        Ok(())
    }

    /// Makes the program current.
    pub fn activate(&mut self, ctx: &C) -> Result<(), ShaderError> {
        if !self.is_linked() {
            return Err(ShaderError::ProgramNotLinked);
        }
        ctx.use_program(Some(&self.handle));
        self.state = ProgramState::InUse;
        Ok(())
    }

    /// Detaches every attached object that is still a shader.
    pub fn detach_all(&mut self, ctx: &C) {
        for shader in self.attached.drain(..) {
            if ctx.is_shader(&shader) {
                ctx.detach_shader(&self.handle, &shader);
            }
        }
        if self.state == ProgramState::Attached {
            self.state = ProgramState::Created;
        }
    }

    /// Attaches the pair, links, activates and detaches the pair again.
    pub fn use_shaders(&mut self, ctx: &C, shaders: &ShaderPair<C::Shader>) -> Result<(), ShaderError> {
        self.attach(ctx, &shaders.vertex);
        self.attach(ctx, &shaders.fragment);
        let linked = self.link(ctx).and_then(|_| self.activate(ctx));
        for handle in shaders.handles() {
            if ctx.is_shader(handle) {
                ctx.detach_shader(&self.handle, handle);
            }
        }
        self.attached.clear();
        linked
    }

    /// Creates a program from a compiled pair and makes it current.
    pub fn from_pair(ctx: &C, shaders: &ShaderPair<C::Shader>) -> Result<Self, ShaderError> {
        let mut program = Self::create(ctx)?;
        if let Err(err) = program.use_shaders(ctx, shaders) {
            program.delete(ctx);
            return Err(err);
        }
        Ok(program)
    }

    fn location(&self, ctx: &C, name: &str) -> Result<Option<C::UniformLocation>, ShaderError> {
        if !self.is_linked() {
            return Err(ShaderError::ProgramNotLinked);
        }
        let location = ctx.uniform_location(&self.handle, name);
        if location.is_none() {
            log::trace!("Uniform {} is not active", name);
        }
        Ok(location)
    }

    pub fn set_f32(&self, ctx: &C, name: &str, value: f32) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_1f(&location, value);
        }
        Ok(())
    }

    pub fn set_i32(&self, ctx: &C, name: &str, value: i32) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_1i(&location, value);
        }
        Ok(())
    }

    pub fn set_vec2(&self, ctx: &C, name: &str, value: Vec2) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_2f(&location, [value.x as f32, value.y as f32]);
        }
        Ok(())
    }

    pub fn set_vec3(&self, ctx: &C, name: &str, value: Vec3) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_3f(&location, [value.x as f32, value.y as f32, value.z as f32]);
        }
        Ok(())
    }

    /// Uploads the row-major elements without transposition.
    pub fn set_mat3(&self, ctx: &C, name: &str, value: &Mat3) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_matrix3(&location, &value.to_f32_array());
        }
        Ok(())
    }

    /// Uploads the row-major elements without transposition.
    pub fn set_mat4(&self, ctx: &C, name: &str, value: &Mat4) -> Result<(), ShaderError> {
        if let Some(location) = self.location(ctx, name)? {
            ctx.uniform_matrix4(&location, &value.to_f32_array());
        }
        Ok(())
    }

    pub fn delete(self, ctx: &C) {
        ctx.delete_program(&self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::headless::{GpuCall, UniformValue};
    use crate::gpu::HeadlessContext;
    use crate::resource::MemorySource;

    const VERTEX: &str = "attribute vec2 inPosition;\nattribute vec3 inColor;\nuniform mat4 uMVP;\nvoid main() {}";
    const FRAGMENT: &str = "precision mediump float;\nuniform float uTime;\nvoid main() {}";

    fn resources() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert("basic.vert", VERTEX);
        source.insert("basic.frag", FRAGMENT);
        source.insert("broken.vert", VERTEX);
        source.insert("broken.frag", "#error nope\nvoid main() {}");
        source
    }

    #[test]
    fn test_check_shader_resources() {
        assert!(check_shader_resources("a.vert", "b.frag").is_ok());
        assert_eq!(
            check_shader_resources("a.frag", "b.vert"),
            Err(ShaderError::StageMismatch {
                expected: ShaderStage::Vertex,
                resource: "a.frag".to_string(),
            })
        );
        assert!(matches!(
            check_shader_resources("a.vert", "b.vert"),
            Err(ShaderError::StageMismatch {
                expected: ShaderStage::Fragment,
                ..
            })
        ));
    }

    #[test]
    fn test_stage_from_resource() {
        assert_eq!(ShaderStage::of_resource("shaders/a.vert"), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::of_resource("a.frag"), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::of_resource("common.glsl"), None);
        assert!(is_shader_resource("common.glsl"));
        assert!(!is_shader_resource("model.obj"));
        assert_eq!(ShaderStage::Fragment.resource_name("basic"), "basic.frag");
    }

    #[test]
    fn test_mismatch_creates_no_objects() {
        let ctx = HeadlessContext::new();
        let result = load_shaders(&ctx, &resources(), "basic.frag", "basic.vert");
        assert!(matches!(result, Err(ShaderError::StageMismatch { .. })));
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn test_missing_resource() {
        let ctx = HeadlessContext::new();
        let result = load_shaders_by_name(&ctx, &resources(), "missing");
        assert!(matches!(result, Err(ShaderError::ResourceUnavailable(_))));
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_not_a_shader() {
        let result = shader_resource(&resources(), "model.obj");
        assert_eq!(result, Err(ShaderError::NotAShader("model.obj".to_string())));
    }

    #[test]
    fn test_compile_failure_releases_shader() {
        let ctx = HeadlessContext::new();
        let result = load_shaders_by_name(&ctx, &resources(), "broken");
        match result {
            Err(ShaderError::CompileFailed { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("#error"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_creation_failure() {
        let ctx = HeadlessContext::new();
        ctx.set_exhausted(true);
        assert_eq!(
            compile_shader(&ctx, ShaderStage::Vertex, VERTEX),
            Err(ShaderError::ShaderCreationFailed(ShaderStage::Vertex))
        );
        assert!(matches!(
            ShaderProgram::create(&ctx),
            Err(ShaderError::ProgramCreationFailed)
        ));
    }

    #[test]
    fn test_use_shaders_lifecycle() {
        let ctx = HeadlessContext::new();
        let pair = load_shaders_by_name(&ctx, &resources(), "basic").unwrap();
        let mut program = ShaderProgram::create(&ctx).unwrap();
        assert_eq!(program.state(), ProgramState::Created);

        program.use_shaders(&ctx, &pair).unwrap();
        assert_eq!(program.state(), ProgramState::InUse);
        assert_eq!(ctx.current_program(), Some(*program.handle()));
        assert!(ctx.attached_shaders(*program.handle()).is_empty());

        // Detaching keeps the link result.
        assert!(ctx.link_status(program.handle()));
        assert_eq!(ctx.attrib_location(program.handle(), "inColor"), Some(1));

        pair.release(&ctx);
        assert_eq!(ctx.live_shaders(), 0);
    }

    #[test]
    fn test_detach_skips_deleted_shaders() {
        let ctx = HeadlessContext::new();
        let pair = load_shaders_by_name(&ctx, &resources(), "basic").unwrap();
        let mut program = ShaderProgram::create(&ctx).unwrap();
        program.attach(&ctx, &pair.vertex);
        program.attach(&ctx, &pair.fragment);
        assert_eq!(program.state(), ProgramState::Attached);

        ctx.delete_shader(&pair.vertex.handle);
        ctx.clear_calls();
        program.detach_all(&ctx);

        let detached: Vec<_> = ctx
            .calls()
            .into_iter()
            .filter(|call| matches!(call, GpuCall::DetachShader { .. }))
            .collect();
        assert_eq!(
            detached,
            vec![GpuCall::DetachShader {
                program: *program.handle(),
                shader: pair.fragment.handle,
            }]
        );
    }

    #[test]
    fn test_link_failure_never_reaches_in_use() {
        let ctx = HeadlessContext::new();
        let vertex = compile_shader(&ctx, ShaderStage::Vertex, VERTEX).unwrap();
        let mut program = ShaderProgram::create(&ctx).unwrap();
        program.attach(&ctx, &vertex);

        assert!(matches!(program.link(&ctx), Err(ShaderError::LinkFailed { .. })));
        assert_eq!(program.activate(&ctx), Err(ShaderError::ProgramNotLinked));
        assert_eq!(program.state(), ProgramState::Attached);
        assert_eq!(ctx.current_program(), None);
    }

    #[test]
    fn test_uniform_setters() {
        let ctx = HeadlessContext::new();
        let pair = load_shaders_by_name(&ctx, &resources(), "basic").unwrap();
        let program = ShaderProgram::from_pair(&ctx, &pair).unwrap();

        program.set_f32(&ctx, "uTime", 0.5).unwrap();
        program.set_mat4(&ctx, "uMVP", &Mat4::transl(1.0, 2.0, 3.0)).unwrap();
        // Inactive uniforms are ignored.
        program.set_i32(&ctx, "uUnknown", 3).unwrap();

        let handle = *program.handle();
        assert_eq!(ctx.uniform_value(handle, "uTime"), Some(UniformValue::Float(0.5)));
        match ctx.uniform_value(handle, "uMVP") {
            Some(UniformValue::Mat4(m)) => assert_eq!(&m[12..], &[1.0, 2.0, 3.0, 1.0]),
            other => panic!("unexpected uniform: {:?}", other),
        }
    }

    #[test]
    fn test_uniform_on_unlinked_program() {
        let ctx = HeadlessContext::new();
        let program = ShaderProgram::create(&ctx).unwrap();
        assert_eq!(
            program.set_f32(&ctx, "uTime", 1.0),
            Err(ShaderError::ProgramNotLinked)
        );
    }
}
