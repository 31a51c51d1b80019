/// Draws one indexed mesh with one program.
use serde::{Deserialize, Serialize};

use crate::buffer::{BufferHandles, GeometryBuffer};
use crate::camera::Camera;
use crate::error::Result;
use crate::gpu::GpuContext;
use crate::math::{Mat3, Mat4};
use crate::resource::ResourceSource;
use crate::shader::{load_shaders_by_name, ShaderProgram};

/// Uniform names the renderer writes each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformNames {
    pub projection: String,
    pub view: String,
    pub model: String,
    pub normal: String,
}

impl Default for UniformNames {
    fn default() -> Self {
        Self {
            projection: "uPMatrix".to_string(),
            view: "uVMatrix".to_string(),
            model: "uMMatrix".to_string(),
            normal: "uNMatrix".to_string(),
        }
    }
}

/// A linked program with uploaded geometry.
pub struct MeshRenderer<C: GpuContext> {
    program: ShaderProgram<C>,
    buffers: BufferHandles<C::Buffer>,
    uniforms: UniformNames,
}

impl<C: GpuContext> MeshRenderer<C> {
    /// Uploads `geometry` against an already linked program.
    ///
    /// On failure the program is deleted.
    pub fn new(
        ctx: &C,
        program: ShaderProgram<C>,
        geometry: &GeometryBuffer,
        uniforms: UniformNames,
    ) -> Result<Self> {
        match geometry.upload(ctx, Some(&program)) {
            Ok(buffers) => Ok(Self {
                program,
                buffers,
                uniforms,
            }),
            Err(err) => {
                program.delete(ctx);
                Err(err.into())
            }
        }
    }

    /// Loads `<shader>.vert`/`<shader>.frag`, links them and uploads
    /// `geometry`. The shader objects are released once linked.
    pub fn from_resources<R: ResourceSource + ?Sized>(
        ctx: &C,
        resources: &R,
        shader: &str,
        geometry: &GeometryBuffer,
        uniforms: UniformNames,
    ) -> Result<Self> {
        let pair = load_shaders_by_name(ctx, resources, shader)?;
        let program = ShaderProgram::from_pair(ctx, &pair);
        pair.release(ctx);
        Self::new(ctx, program?, geometry, uniforms)
    }

    pub fn program(&self) -> &ShaderProgram<C> {
        &self.program
    }

    pub fn buffers(&self) -> &BufferHandles<C::Buffer> {
        &self.buffers
    }

    /// Pushes the projection, view, model and normal matrices and issues one
    /// indexed triangle draw.
    pub fn draw(&mut self, ctx: &C, camera: &Camera, projection: &Mat4, model: &Mat4) -> Result<()> {
        let view = camera.view_matrix();
        let model_view = Mat3::from(model.mul(&view));
        // Inverse-transpose keeps normals perpendicular under non-uniform scale.
        let normal = model_view
            .inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or(model_view);

        self.program.activate(ctx)?;
        self.program.set_mat4(ctx, &self.uniforms.projection, projection)?;
        self.program.set_mat4(ctx, &self.uniforms.view, &view)?;
        self.program.set_mat4(ctx, &self.uniforms.model, model)?;
        self.program.set_mat3(ctx, &self.uniforms.normal, &normal)?;

        ctx.draw_elements(self.buffers.index_count, 0);
        log::trace!("Drew {} indices", self.buffers.index_count);
        Ok(())
    }

    /// Deletes the buffers and the program.
    pub fn release(self, ctx: &C) {
        self.buffers.release(ctx);
        self.program.delete(ctx);
    }
}
