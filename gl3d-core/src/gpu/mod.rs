//! The GPU capability set the pipeline is written against.
//!
//! Implementations wrap a concrete context (WebGL in `gl3d-web`, the
//! recording [`headless::HeadlessContext`] in tests). All methods take
//! `&self`; contexts are single-threaded and use interior mutability where
//! they keep state.

use std::fmt::Debug;

use crate::shader::ShaderStage;

pub mod headless;

pub use headless::HeadlessContext;

/// Size in bytes of one vertex scalar (`f32`).
pub const FLOAT_SIZE: i32 = 4;

/// Highest texture unit index a context is required to support.
pub const MAX_TEXTURE_UNIT: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// Shader, program, buffer, uniform, draw and texture operations of a
/// GL-style context.
pub trait GpuContext {
    type Shader: Clone + Debug;
    type Program: Clone + Debug;
    type Buffer: Clone + Debug;
    type UniformLocation: Clone + Debug;
    type Texture: Clone + Debug;

    // Shader objects
    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn shader_source(&self, shader: &Self::Shader, source: &str);
    fn compile_shader(&self, shader: &Self::Shader);
    fn compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn is_shader(&self, shader: &Self::Shader) -> bool;
    fn delete_shader(&self, shader: &Self::Shader);

    // Program objects
    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn detach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: Option<&Self::Program>);
    fn delete_program(&self, program: &Self::Program);

    // Buffers (uploaded once, drawn many times)
    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>);
    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]);
    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]);
    fn delete_buffer(&self, buffer: &Self::Buffer);

    // Vertex attributes (always `f32`, never normalized)
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, location: u32);

    // Uniforms
    fn uniform_location(&self, program: &Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    fn uniform_1f(&self, location: &Self::UniformLocation, value: f32);
    fn uniform_1i(&self, location: &Self::UniformLocation, value: i32);
    fn uniform_2f(&self, location: &Self::UniformLocation, value: [f32; 2]);
    fn uniform_3f(&self, location: &Self::UniformLocation, value: [f32; 3]);
    fn uniform_matrix3(&self, location: &Self::UniformLocation, value: &[f32; 9]);
    fn uniform_matrix4(&self, location: &Self::UniformLocation, value: &[f32; 16]);

    /// Draws `count` triangle indices (`u16`) starting at byte `offset`.
    fn draw_elements(&self, count: i32, offset: i32);

    // Frame state
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn enable_depth_test(&self);
    /// Clears the color and depth buffers.
    fn clear(&self, color: [f32; 4]);

    // 2D textures (RGBA8)
    fn create_texture(&self) -> Option<Self::Texture>;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: Option<&Self::Texture>);
    /// Sets linear minification and magnification on the bound texture.
    fn tex_linear_filtering(&self);
    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]);
    fn delete_texture(&self, texture: &Self::Texture);
}
