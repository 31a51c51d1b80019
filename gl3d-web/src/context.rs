//! `GpuContext` over a WebGL2 rendering context.

use gl3d_core::gpu::{BufferTarget, GpuContext};
use gl3d_core::ShaderStage;
use web_sys::{WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation};

pub struct WebGlContext {
    gl: Gl,
}

impl WebGlContext {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => Gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => Gl::ELEMENT_ARRAY_BUFFER,
    }
}


impl GpuContext for WebGlContext {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type UniformLocation = WebGlUniformLocation;
    type Texture = WebGlTexture;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => Gl::VERTEX_SHADER,
            ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
        };
        self.gl.create_shader(kind)
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
    }

    fn compile_shader(&self, shader: &WebGlShader) {
        self.gl.compile_shader(shader);
    }

    fn compile_status(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn is_shader(&self, shader: &WebGlShader) -> bool {
        self.gl.is_shader(Some(shader))
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn detach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.detach_shader(program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn link_status(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        self.gl.use_program(program);
    }

    fn delete_program(&self, program: &WebGlProgram) {
        self.gl.delete_program(Some(program));
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&WebGlBuffer>) {
        self.gl.bind_buffer(buffer_target(target), buffer);
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]) {
        // SAFETY: the view is consumed by `buffer_data` before any allocation
        // could move wasm memory.
        unsafe {
            let view = js_sys::Float32Array::view(data);
            self.gl
                .buffer_data_with_array_buffer_view(buffer_target(target), &view, Gl::STATIC_DRAW);
        }
    }

    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]) {
        // SAFETY: as in `buffer_data_f32`.
        unsafe {
            let view = js_sys::Uint16Array::view(data);
            self.gl
                .buffer_data_with_array_buffer_view(buffer_target(target), &view, Gl::STATIC_DRAW);
        }
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        u32::try_from(self.gl.get_attrib_location(program, name)).ok()
    }

    fn vertex_attrib_pointer(&self, location: u32, components: i32, stride: i32, offset: i32) {
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, stride, offset);
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn uniform_1f(&self, location: &WebGlUniformLocation, value: f32) {
        self.gl.uniform1f(Some(location), value);
    }

    fn uniform_1i(&self, location: &WebGlUniformLocation, value: i32) {
        self.gl.uniform1i(Some(location), value);
    }

    fn uniform_2f(&self, location: &WebGlUniformLocation, [x, y]: [f32; 2]) {
        self.gl.uniform2f(Some(location), x, y);
    }

    fn uniform_3f(&self, location: &WebGlUniformLocation, [x, y, z]: [f32; 3]) {
        self.gl.uniform3f(Some(location), x, y, z);
    }

    // Row-major data uploaded untransposed reads as the transpose in GLSL,
    // so `M * v` in a shader equals the row-vector product `v * M`.
    fn uniform_matrix3(&self, location: &WebGlUniformLocation, value: &[f32; 9]) {
        self.gl
            .uniform_matrix3fv_with_f32_array(Some(location), false, value);
    }

    fn uniform_matrix4(&self, location: &WebGlUniformLocation, value: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, value);
    }

    fn draw_elements(&self, count: i32, offset: i32) {
        self.gl
            .draw_elements_with_i32(Gl::TRIANGLES, count, Gl::UNSIGNED_SHORT, offset);
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.gl.viewport(x, y, width, height);
    }

    fn enable_depth_test(&self) {
        self.gl.enable(Gl::DEPTH_TEST);
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    fn create_texture(&self) -> Option<WebGlTexture> {
        self.gl.create_texture()
    }

    fn active_texture(&self, unit: u32) {
        self.gl.active_texture(Gl::TEXTURE0 + unit);
    }

    fn bind_texture(&self, texture: Option<&WebGlTexture>) {
        self.gl.bind_texture(Gl::TEXTURE_2D, texture);
    }

    fn tex_linear_filtering(&self) {
        for parameter in [Gl::TEXTURE_MIN_FILTER, Gl::TEXTURE_MAG_FILTER] {
            self.gl
                .tex_parameteri(Gl::TEXTURE_2D, parameter, Gl::LINEAR as i32);
        }
    }

    fn tex_image_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        let result = self
            .gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                Gl::TEXTURE_2D,
                0,
                Gl::RGBA as i32,
                width as i32,
                height as i32,
                0,
                Gl::RGBA,
                Gl::UNSIGNED_BYTE,
                Some(pixels),
            );
        if let Err(err) = result {
            log::error!("texImage2D failed: {:?}", err);
        }
    }

    fn delete_texture(&self, texture: &WebGlTexture) {
        self.gl.delete_texture(Some(texture));
    }
}
