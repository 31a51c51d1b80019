//! A recording software context.
//!
//! `HeadlessContext` keeps just enough object state to behave like a GL
//! context towards the pipeline: shaders "compile" by scanning their source
//! for `attribute`/`in` and `uniform` declarations, and fail when the source
//! is empty or carries an `#error` directive. Programs link when exactly one
//! compiled vertex and one compiled fragment shader are attached. Every call
//! is recorded for inspection.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{BufferTarget, GpuContext};
use crate::shader::ShaderStage;

/// Opaque object name handed out by the headless context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

/// Uniform location: owning program plus slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformSlot {
    pub program: ObjectId,
    pub slot: u32,
}

/// Last value written to a uniform.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// A recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateShader(ShaderStage, ObjectId),
    CompileShader(ObjectId),
    DeleteShader(ObjectId),
    CreateProgram(ObjectId),
    AttachShader { program: ObjectId, shader: ObjectId },
    DetachShader { program: ObjectId, shader: ObjectId },
    LinkProgram(ObjectId),
    UseProgram(Option<ObjectId>),
    DeleteProgram(ObjectId),
    CreateBuffer(ObjectId),
    BindBuffer(BufferTarget, Option<ObjectId>),
    BufferData {
        target: BufferTarget,
        buffer: Option<ObjectId>,
        bytes: usize,
    },
    DeleteBuffer(ObjectId),
    VertexAttribPointer {
        location: u32,
        components: i32,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray(u32),
    Uniform { name: String, value: UniformValue },
    DrawElements { count: i32, offset: i32 },
    Viewport(i32, i32, i32, i32),
    EnableDepthTest,
    Clear([f32; 4]),
    CreateTexture(ObjectId),
    ActiveTexture(u32),
    BindTexture(Option<ObjectId>),
    TexImage { width: u32, height: u32, bytes: usize },
    DeleteTexture(ObjectId),
}

#[derive(Debug, Default)]
struct ShaderObject {
    stage: Option<ShaderStage>,
    source: String,
    compiled: bool,
    log: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ObjectId>,
    linked: bool,
    log: Option<String>,
    attributes: Vec<String>,
    uniforms: Vec<String>,
    values: HashMap<String, UniformValue>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    exhausted: bool,
    shaders: HashMap<ObjectId, ShaderObject>,
    programs: HashMap<ObjectId, ProgramObject>,
    buffers: HashMap<ObjectId, usize>,
    textures: HashMap<ObjectId, (u32, u32)>,
    bound: HashMap<BufferTarget, ObjectId>,
    bound_texture: Option<ObjectId>,
    current_program: Option<ObjectId>,
    calls: Vec<GpuCall>,
}

impl State {
    fn allocate(&mut self) -> Option<ObjectId> {
        if self.exhausted {
            return None;
        }
        self.next_id += 1;
        Some(ObjectId(self.next_id))
    }
}

/// Recording software implementation of [`GpuContext`].
#[derive(Debug, Default)]
pub struct HeadlessContext {
    state: RefCell<State>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every `create_*` call returns no object.
    pub fn set_exhausted(&self, exhausted: bool) {
        self.state.borrow_mut().exhausted = exhausted;
    }

    /// All calls recorded so far.
    pub fn calls(&self) -> Vec<GpuCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    /// Size in bytes of the data last uploaded into `buffer`.
    pub fn buffer_size(&self, buffer: ObjectId) -> Option<usize> {
        self.state.borrow().buffers.get(&buffer).copied()
    }

    pub fn current_program(&self) -> Option<ObjectId> {
        self.state.borrow().current_program
    }

    /// Shaders currently attached to `program`.
    pub fn attached_shaders(&self, program: ObjectId) -> Vec<ObjectId> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// Last value written to the named uniform of `program`.
    pub fn uniform_value(&self, program: ObjectId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.values.get(name).cloned())
    }

    fn record(&self, call: GpuCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn set_uniform(&self, location: &UniformSlot, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let Some(program) = state.programs.get_mut(&location.program) else {
            return;
        };
        let Some(name) = program.uniforms.get(location.slot as usize).cloned() else {
            return;
        };
        program.values.insert(name.clone(), value.clone());
        state.calls.push(GpuCall::Uniform { name, value });
    }
}

/// Extracts the declared names following `keywords` from GLSL-like source.
fn declarations(source: &str, keywords: &[&str]) -> Vec<String> {
    let mut names = Vec::new();
    for statement in source.split(';') {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let Some(position) = tokens.iter().position(|t| keywords.contains(t)) else {
            continue;
        };
        if let Some(&last) = tokens.get(position + 2..).and_then(|rest| rest.last()) {
            let name = last.split('[').next().unwrap_or(last);
            names.push(name.to_string());
        }
    }
    names
}

impl GpuContext for HeadlessContext {
    type Shader = ObjectId;
    type Program = ObjectId;
    type Buffer = ObjectId;
    type UniformLocation = UniformSlot;
    type Texture = ObjectId;

    fn create_shader(&self, stage: ShaderStage) -> Option<ObjectId> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.shaders.insert(
            id,
            ShaderObject {
                stage: Some(stage),
                ..Default::default()
            },
        );
        state.calls.push(GpuCall::CreateShader(stage, id));
        Some(id)
    }

    fn shader_source(&self, shader: &ObjectId, source: &str) {
        if let Some(object) = self.state.borrow_mut().shaders.get_mut(shader) {
            object.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GpuCall::CompileShader(*shader));
        let Some(object) = state.shaders.get_mut(shader) else {
            return;
        };

        let error_line = object
            .source
            .lines()
            .position(|line| line.trim_start().starts_with("#error"));
        if object.source.trim().is_empty() {
            object.compiled = false;
            object.log = Some("ERROR: 0:0: empty shader source".to_string());
        } else if let Some(line) = error_line {
            object.compiled = false;
            object.log = Some(format!("ERROR: 0:{}: '#error' : user error", line + 1));
        } else {
            let inputs: &[&str] = match object.stage {
                Some(ShaderStage::Vertex) => &["attribute", "in"],
                _ => &[],
            };
            object.attributes = declarations(&object.source, inputs);
            object.uniforms = declarations(&object.source, &["uniform"]);
            object.compiled = true;
            object.log = None;
        }
    }

    fn compile_status(&self, shader: &ObjectId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: &ObjectId) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(shader)
            .and_then(|s| s.log.clone())
    }

    fn is_shader(&self, shader: &ObjectId) -> bool {
        self.state.borrow().shaders.contains_key(shader)
    }

    fn delete_shader(&self, shader: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.shaders.remove(shader);
        state.calls.push(GpuCall::DeleteShader(*shader));
    }

    fn create_program(&self) -> Option<ObjectId> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.programs.insert(id, ProgramObject::default());
        state.calls.push(GpuCall::CreateProgram(id));
        Some(id)
    }

    fn attach_shader(&self, program: &ObjectId, shader: &ObjectId) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(program) {
            if !p.attached.contains(shader) {
                p.attached.push(*shader);
            }
        }
        state.calls.push(GpuCall::AttachShader {
            program: *program,
            shader: *shader,
        });
    }

    fn detach_shader(&self, program: &ObjectId, shader: &ObjectId) {
        let mut state = self.state.borrow_mut();
        if let Some(p) = state.programs.get_mut(program) {
            p.attached.retain(|s| s != shader);
        }
        state.calls.push(GpuCall::DetachShader {
            program: *program,
            shader: *shader,
        });
    }

    fn link_program(&self, program: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.calls.push(GpuCall::LinkProgram(*program));
        let Some(attached) = state.programs.get(program).map(|p| p.attached.clone()) else {
            return;
        };

        let mut vertex = Vec::new();
        let mut fragment = Vec::new();
        for id in &attached {
            match state.shaders.get(id) {
                Some(s) if s.compiled && s.stage == Some(ShaderStage::Vertex) => vertex.push(s),
                Some(s) if s.compiled && s.stage == Some(ShaderStage::Fragment) => {
                    fragment.push(s)
                }
                _ => {}
            }
        }

        let outcome = match (vertex.as_slice(), fragment.as_slice()) {
            ([vs], [fs]) => {
                let mut uniforms = vs.uniforms.clone();
                for name in &fs.uniforms {
                    if !uniforms.contains(name) {
                        uniforms.push(name.clone());
                    }
                }
                Ok((vs.attributes.clone(), uniforms))
            }
            ([], _) => Err("no compiled vertex shader attached".to_string()),
            (_, []) => Err("no compiled fragment shader attached".to_string()),
            _ => Err("more than one shader attached per stage".to_string()),
        };

        if let Some(p) = state.programs.get_mut(program) {
            match outcome {
                Ok((attributes, uniforms)) => {
                    p.linked = true;
                    p.log = None;
                    p.attributes = attributes;
                    p.uniforms = uniforms;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = Some(log);
                    p.attributes.clear();
                    p.uniforms.clear();
                }
            }
        }
    }

    fn link_status(&self, program: &ObjectId) -> bool {
        self.state
            .borrow()
            .programs
            .get(program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: &ObjectId) -> Option<String> {
        self.state
            .borrow()
            .programs
            .get(program)
            .and_then(|p| p.log.clone())
    }

    fn use_program(&self, program: Option<&ObjectId>) {
        let mut state = self.state.borrow_mut();
        state.current_program = program.copied();
        state.calls.push(GpuCall::UseProgram(program.copied()));
    }

    fn delete_program(&self, program: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(program);
        if state.current_program == Some(*program) {
            state.current_program = None;
        }
        state.calls.push(GpuCall::DeleteProgram(*program));
    }

    fn create_buffer(&self) -> Option<ObjectId> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.buffers.insert(id, 0);
        state.calls.push(GpuCall::CreateBuffer(id));
        Some(id)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&ObjectId>) {
        let mut state = self.state.borrow_mut();
        match buffer {
            Some(id) => state.bound.insert(target, *id),
            None => state.bound.remove(&target),
        };
        state.calls.push(GpuCall::BindBuffer(target, buffer.copied()));
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]) {
        let mut state = self.state.borrow_mut();
        let bytes = std::mem::size_of_val(data);
        let buffer = state.bound.get(&target).copied();
        if let Some(size) = buffer.and_then(|id| state.buffers.get_mut(&id)) {
            *size = bytes;
        }
        state.calls.push(GpuCall::BufferData {
            target,
            buffer,
            bytes,
        });
    }

    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]) {
        let mut state = self.state.borrow_mut();
        let bytes = std::mem::size_of_val(data);
        let buffer = state.bound.get(&target).copied();
        if let Some(size) = buffer.and_then(|id| state.buffers.get_mut(&id)) {
            *size = bytes;
        }
        state.calls.push(GpuCall::BufferData {
            target,
            buffer,
            bytes,
        });
    }

    fn delete_buffer(&self, buffer: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.buffers.remove(buffer);
        state.bound.retain(|_, bound| *bound != *buffer);
        state.calls.push(GpuCall::DeleteBuffer(*buffer));
    }

    fn attrib_location(&self, program: &ObjectId, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let program = state.programs.get(program).filter(|p| p.linked)?;
        program
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|index| index as u32)
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.record(GpuCall::VertexAttribPointer {
            location,
            components,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GpuCall::EnableVertexAttribArray(location));
    }

    fn uniform_location(&self, program: &ObjectId, name: &str) -> Option<UniformSlot> {
        let state = self.state.borrow();
        let object = state.programs.get(program).filter(|p| p.linked)?;
        object
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|slot| UniformSlot {
                program: *program,
                slot: slot as u32,
            })
    }

    fn uniform_1f(&self, location: &UniformSlot, value: f32) {
        self.set_uniform(location, UniformValue::Float(value));
    }

    fn uniform_1i(&self, location: &UniformSlot, value: i32) {
        self.set_uniform(location, UniformValue::Int(value));
    }

    fn uniform_2f(&self, location: &UniformSlot, value: [f32; 2]) {
        self.set_uniform(location, UniformValue::Vec2(value));
    }

    fn uniform_3f(&self, location: &UniformSlot, value: [f32; 3]) {
        self.set_uniform(location, UniformValue::Vec3(value));
    }

    fn uniform_matrix3(&self, location: &UniformSlot, value: &[f32; 9]) {
        self.set_uniform(location, UniformValue::Mat3(*value));
    }

    fn uniform_matrix4(&self, location: &UniformSlot, value: &[f32; 16]) {
        self.set_uniform(location, UniformValue::Mat4(*value));
    }

    fn draw_elements(&self, count: i32, offset: i32) {
        self.record(GpuCall::DrawElements { count, offset });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GpuCall::Viewport(x, y, width, height));
    }

    fn enable_depth_test(&self) {
        self.record(GpuCall::EnableDepthTest);
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(GpuCall::Clear(color));
    }

    fn create_texture(&self) -> Option<ObjectId> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate()?;
        state.textures.insert(id, (0, 0));
        state.calls.push(GpuCall::CreateTexture(id));
        Some(id)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GpuCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, texture: Option<&ObjectId>) {
        let mut state = self.state.borrow_mut();
        state.bound_texture = texture.copied();
        state.calls.push(GpuCall::BindTexture(texture.copied()));
    }

    fn tex_linear_filtering(&self) {}

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(size) = state
            .bound_texture
            .and_then(|id| state.textures.get_mut(&id))
        {
            *size = (width, height);
        }
        state.calls.push(GpuCall::TexImage {
            width,
            height,
            bytes: pixels.len(),
        });
    }

    fn delete_texture(&self, texture: &ObjectId) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(texture);
        if state.bound_texture == Some(*texture) {
            state.bound_texture = None;
        }
        state.calls.push(GpuCall::DeleteTexture(*texture));
    }
}
