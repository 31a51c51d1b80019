/// Vertex/index buffers and their attribute layout.
///
/// A [`GeometryBuffer`] is CPU-side data. [`upload`] hands it to the context:
/// it creates static array and element buffers, binds them and points every
/// attribute descriptor at the program's matching attribute. The returned
/// [`BufferHandles`] belong to the caller.
use crate::error::BindError;
use crate::gpu::{BufferTarget, GpuContext, FLOAT_SIZE};
use crate::shader::ShaderProgram;

/// How one vertex field is read from an interleaved float stream.
///
/// `stride` and `offset` are in bytes. A stride of zero means the stream is
/// tightly packed with this attribute alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: String,
    pub components: i32,
    pub stride: i32,
    pub offset: i32,
}

impl VertexAttribute {
    pub fn new(name: impl Into<String>, components: i32, stride: i32, offset: i32) -> Self {
        Self {
            name: name.into(),
            components,
            stride,
            offset,
        }
    }

    /// A tightly packed attribute at offset zero.
    pub fn packed(name: impl Into<String>, components: i32) -> Self {
        Self::new(name, components, 0, 0)
    }

    pub fn byte_size(&self) -> i32 {
        self.components * FLOAT_SIZE
    }

    pub fn effective_stride(&self) -> i32 {
        if self.stride == 0 {
            self.byte_size()
        } else {
            self.stride
        }
    }

    /// Checks that the layout addresses valid offsets of a stream of
    /// `floats` values.
    pub fn validate(&self, floats: usize) -> Result<(), BindError> {
        let invalid = |reason: String| BindError::InvalidLayout {
            name: self.name.clone(),
            reason,
        };

        if !(1..=4).contains(&self.components) {
            return Err(invalid(format!(
                "{} components, expected 1 to 4",
                self.components
            )));
        }
        if self.stride < 0 || self.offset < 0 {
            return Err(invalid("negative stride or offset".to_string()));
        }
        if self.stride % FLOAT_SIZE != 0 || self.offset % FLOAT_SIZE != 0 {
            return Err(invalid("stride and offset must be float aligned".to_string()));
        }
        let end = self.offset + self.byte_size();
        if end > self.effective_stride() {
            return Err(invalid(format!(
                "field ends at byte {} past stride {}",
                end,
                self.effective_stride()
            )));
        }
        let stream_bytes = floats * FLOAT_SIZE as usize;
        if end as usize > stream_bytes {
            return Err(invalid(format!(
                "field ends at byte {} past a {} byte stream",
                end, stream_bytes
            )));
        }
        if stream_bytes % self.effective_stride() as usize != 0 {
            return Err(invalid(format!(
                "{} byte stream is not a whole number of {} byte vertices",
                stream_bytes,
                self.effective_stride()
            )));
        }
        Ok(())
    }

    /// Number of vertices this attribute reads from a stream of `floats`
    /// values.
    pub fn vertex_count(&self, floats: usize) -> usize {
        match usize::try_from(self.effective_stride()) {
            Ok(stride) if stride > 0 => floats * FLOAT_SIZE as usize / stride,
            _ => 0,
        }
    }
}

/// A separate float stream with its own attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeStream {
    pub data: Vec<f32>,
    pub attribute: VertexAttribute,
}

/// Drawable geometry: vertex stream, attribute layout and index list, plus
/// optional color and texture coordinate streams.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    pub vertices: Vec<f32>,
    pub attributes: Vec<VertexAttribute>,
    pub indices: Vec<u16>,
    pub colors: Option<AttributeStream>,
    pub tex_coords: Option<AttributeStream>,
}

impl GeometryBuffer {
    pub fn new(vertices: Vec<f32>, attributes: Vec<VertexAttribute>, indices: Vec<u16>) -> Self {
        Self {
            vertices,
            attributes,
            indices,
            colors: None,
            tex_coords: None,
        }
    }

    pub fn with_colors(mut self, data: Vec<f32>, attribute: VertexAttribute) -> Self {
        self.colors = Some(AttributeStream { data, attribute });
        self
    }

    pub fn with_tex_coords(mut self, data: Vec<f32>, attribute: VertexAttribute) -> Self {
        self.tex_coords = Some(AttributeStream { data, attribute });
        self
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Validates every attribute layout against its stream, and every index
    /// against the vertices all streams provide.
    pub fn validate(&self) -> Result<(), BindError> {
        for attribute in &self.attributes {
            attribute.validate(self.vertices.len())?;
        }
        for stream in self.extra_streams() {
            stream.attribute.validate(stream.data.len())?;
        }

        let Some(&index) = self.indices.iter().max() else {
            return Ok(());
        };
        let vertices = self.vertex_count();
        if usize::from(index) >= vertices {
            return Err(BindError::IndexOutOfRange { index, vertices });
        }
        Ok(())
    }

    /// Vertices addressable through every attribute of every stream.
    pub fn vertex_count(&self) -> usize {
        let main = self
            .attributes
            .iter()
            .map(|attribute| attribute.vertex_count(self.vertices.len()));
        let extra = self
            .extra_streams()
            .map(|stream| stream.attribute.vertex_count(stream.data.len()));
        main.chain(extra).min().unwrap_or(0)
    }

    fn extra_streams(&self) -> impl Iterator<Item = &AttributeStream> {
        self.colors.iter().chain(self.tex_coords.iter())
    }

    /// Uploads and binds this geometry against `program`.
    pub fn upload<C: GpuContext>(
        &self,
        ctx: &C,
        program: Option<&ShaderProgram<C>>,
    ) -> Result<BufferHandles<C::Buffer>, BindError> {
        upload(ctx, program, self)
    }
}

/// GPU buffers created by [`upload`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferHandles<B> {
    pub vertex: B,
    pub index: B,
    pub color: Option<B>,
    pub tex_coord: Option<B>,
    pub index_count: i32,
}

impl<B> BufferHandles<B> {
    pub fn release<C: GpuContext<Buffer = B>>(self, ctx: &C) {
        ctx.delete_buffer(&self.vertex);
        ctx.delete_buffer(&self.index);
        if let Some(color) = &self.color {
            ctx.delete_buffer(color);
        }
        if let Some(tex_coord) = &self.tex_coord {
            ctx.delete_buffer(tex_coord);
        }
    }
}

/// Buffers created so far, deleted again unless finished.
struct PendingBuffers<'a, C: GpuContext> {
    ctx: &'a C,
    created: Vec<C::Buffer>,
}

impl<'a, C: GpuContext> PendingBuffers<'a, C> {
    fn create(&mut self) -> Result<C::Buffer, BindError> {
        let buffer = self
            .ctx
            .create_buffer()
            .ok_or(BindError::BufferCreationFailed)?;
        self.created.push(buffer.clone());
        Ok(buffer)
    }

    fn finish(mut self) {
        self.created.clear();
    }
}

impl<C: GpuContext> Drop for PendingBuffers<'_, C> {
    fn drop(&mut self) {
        for buffer in self.created.drain(..) {
            self.ctx.delete_buffer(&buffer);
        }
    }
}

fn bind_attribute<C: GpuContext>(
    ctx: &C,
    program: &C::Program,
    attribute: &VertexAttribute,
) -> Result<(), BindError> {
    let location = ctx
        .attrib_location(program, &attribute.name)
        .ok_or_else(|| BindError::AttributeNotFound {
            name: attribute.name.clone(),
        })?;
    ctx.vertex_attrib_pointer(
        location,
        attribute.components,
        attribute.stride,
        attribute.offset,
    );
    ctx.enable_vertex_attrib_array(location);
    Ok(())
}

fn upload_stream<C: GpuContext>(
    ctx: &C,
    pending: &mut PendingBuffers<'_, C>,
    program: &C::Program,
    stream: &AttributeStream,
) -> Result<C::Buffer, BindError> {
    let buffer = pending.create()?;
    ctx.bind_buffer(BufferTarget::Array, Some(&buffer));
    ctx.buffer_data_f32(BufferTarget::Array, &stream.data);
    bind_attribute(ctx, program, &stream.attribute)?;
    Ok(buffer)
}

/// Uploads `geometry` into static buffers and binds its layout to `program`.
///
/// Fails before touching the context when the program is absent or not
/// linked, or when a layout is invalid. Buffers created before a later
/// failure are deleted again.
pub fn upload<C: GpuContext>(
    ctx: &C,
    program: Option<&ShaderProgram<C>>,
    geometry: &GeometryBuffer,
) -> Result<BufferHandles<C::Buffer>, BindError> {
    let program = program.ok_or(BindError::NoProgram)?;
    if !program.is_linked() {
        return Err(BindError::ProgramNotLinked);
    }
    geometry.validate()?;
    let index_count = i32::try_from(geometry.indices.len()).map_err(|_| BindError::InvalidLayout {
        name: "indices".to_string(),
        reason: format!("{} indices exceed the draw count range", geometry.indices.len()),
    })?;

    let handle = program.handle();
    let mut pending = PendingBuffers {
        ctx,
        created: Vec::new(),
    };

    let vertex = pending.create()?;
    ctx.bind_buffer(BufferTarget::Array, Some(&vertex));
    ctx.buffer_data_f32(BufferTarget::Array, &geometry.vertices);

    let index = pending.create()?;
    ctx.bind_buffer(BufferTarget::ElementArray, Some(&index));
    ctx.buffer_data_u16(BufferTarget::ElementArray, &geometry.indices);

    for attribute in &geometry.attributes {
        bind_attribute(ctx, handle, attribute)?;
    }

    let color = match &geometry.colors {
        Some(stream) => Some(upload_stream(ctx, &mut pending, handle, stream)?),
        None => None,
    };
    let tex_coord = match &geometry.tex_coords {
        Some(stream) => Some(upload_stream(ctx, &mut pending, handle, stream)?),
        None => None,
    };

    pending.finish();
    log::debug!(
        "Uploaded {} floats and {} indices with {} attributes",
        geometry.vertices.len(),
        geometry.indices.len(),
        geometry.attributes.len()
    );

    Ok(BufferHandles {
        vertex,
        index,
        color,
        tex_coord,
        index_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::gpu::headless::GpuCall;
    use crate::gpu::HeadlessContext;
    use crate::shader::{compile_shader, ShaderPair, ShaderStage};

    const TRIANGLE_VS: &str = "in vec2 inPosition;\nin vec3 inColor;\nvoid main() {}";
    const CUBE_VS: &str =
        "attribute vec3 aVertexPosition;\nattribute vec3 aVertexColor;\nattribute vec2 aTextureCoord;\nvoid main() {}";
    const FS: &str = "void main() {}";

    fn program(ctx: &HeadlessContext, vertex: &str) -> ShaderProgram<HeadlessContext> {
        let pair = ShaderPair {
            vertex: compile_shader(ctx, ShaderStage::Vertex, vertex).unwrap(),
            fragment: compile_shader(ctx, ShaderStage::Fragment, FS).unwrap(),
        };
        let program = ShaderProgram::from_pair(ctx, &pair).unwrap();
        pair.release(ctx);
        program
    }

    #[test]
    fn test_layout_validation() {
        assert!(VertexAttribute::new("inColor", 3, 20, 8).validate(15).is_ok());
        assert!(VertexAttribute::packed("inPosition", 2).validate(6).is_ok());
        assert!(VertexAttribute::new("a", 5, 0, 0).validate(10).is_err());
        assert!(VertexAttribute::new("a", 3, 20, 12).validate(15).is_err());
        assert!(VertexAttribute::new("a", 2, 10, 0).validate(15).is_err());
        assert!(VertexAttribute::new("a", 3, 0, 0).validate(2).is_err());
        assert!(VertexAttribute::new("a", 2, 20, 0).validate(0).is_err());
        assert!(matches!(
            VertexAttribute::new("inPosition", 2, 20, 0).validate(7),
            Err(BindError::InvalidLayout { .. })
        ));
        assert_eq!(VertexAttribute::new("inColor", 3, 20, 8).vertex_count(15), 3);
    }

    #[test]
    fn test_ragged_stream_is_rejected() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, TRIANGLE_VS);
        let mut geometry = Geometry::triangle();
        geometry.vertices.truncate(7);
        geometry.indices = vec![0];

        assert!(matches!(
            geometry.upload(&ctx, Some(&program)),
            Err(BindError::InvalidLayout { .. })
        ));
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn test_empty_stream_is_rejected() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, TRIANGLE_VS);
        let mut geometry = Geometry::triangle();
        geometry.vertices.clear();

        assert!(matches!(
            geometry.upload(&ctx, Some(&program)),
            Err(BindError::InvalidLayout { .. })
        ));
    }

    #[test]
    fn test_index_past_last_vertex_is_rejected() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, TRIANGLE_VS);
        let mut geometry = Geometry::triangle();
        geometry.vertices.truncate(10);

        assert_eq!(geometry.vertex_count(), 2);
        assert_eq!(
            geometry.upload(&ctx, Some(&program)),
            Err(BindError::IndexOutOfRange {
                index: 2,
                vertices: 2
            })
        );
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn test_index_checked_against_extra_streams() {
        let mut geometry = Geometry::cube(2.0);
        assert_eq!(geometry.vertex_count(), 24);
        assert!(geometry.validate().is_ok());

        if let Some(colors) = geometry.colors.as_mut() {
            colors.data.truncate(23 * 3);
        }
        assert_eq!(
            geometry.validate(),
            Err(BindError::IndexOutOfRange {
                index: 23,
                vertices: 23
            })
        );
    }

    #[test]
    fn test_triangle_binds_two_buffers() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, TRIANGLE_VS);
        ctx.clear_calls();

        let handles = Geometry::triangle().upload(&ctx, Some(&program)).unwrap();
        assert_ne!(handles.vertex, handles.index);
        assert_eq!(handles.index_count, 3);
        assert_eq!(ctx.buffer_size(handles.vertex), Some(60));
        assert_eq!(ctx.buffer_size(handles.index), Some(6));

        let pointers: Vec<_> = ctx
            .calls()
            .into_iter()
            .filter(|call| matches!(call, GpuCall::VertexAttribPointer { .. }))
            .collect();
        assert_eq!(
            pointers,
            vec![
                GpuCall::VertexAttribPointer {
                    location: 0,
                    components: 2,
                    stride: 20,
                    offset: 0
                },
                GpuCall::VertexAttribPointer {
                    location: 1,
                    components: 3,
                    stride: 20,
                    offset: 8
                },
            ]
        );
        assert!(ctx.calls().contains(&GpuCall::EnableVertexAttribArray(1)));
    }

    #[test]
    fn test_upload_without_program() {
        let ctx = HeadlessContext::new();
        assert_eq!(
            upload(&ctx, None, &Geometry::triangle()),
            Err(BindError::NoProgram)
        );
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn test_upload_to_unlinked_program() {
        let ctx = HeadlessContext::new();
        let program = ShaderProgram::create(&ctx).unwrap();
        assert_eq!(
            Geometry::triangle().upload(&ctx, Some(&program)),
            Err(BindError::ProgramNotLinked)
        );
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn test_missing_attribute_releases_buffers() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, "in vec2 inPosition;\nvoid main() {}");
        let result = Geometry::triangle().upload(&ctx, Some(&program));
        assert_eq!(
            result,
            Err(BindError::AttributeNotFound {
                name: "inColor".to_string()
            })
        );
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn test_extra_streams() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, CUBE_VS);
        let handles = Geometry::cube(2.0).upload(&ctx, Some(&program)).unwrap();

        assert_eq!(handles.index_count, 36);
        let color = handles.color.unwrap();
        let tex_coord = handles.tex_coord.unwrap();
        assert_eq!(ctx.buffer_size(color), Some(24 * 3 * 4));
        assert_eq!(ctx.buffer_size(tex_coord), Some(24 * 2 * 4));
        assert_eq!(ctx.live_buffers(), 4);

        handles.release(&ctx);
        assert_eq!(ctx.live_buffers(), 0);
    }

    #[test]
    fn test_buffer_creation_failure() {
        let ctx = HeadlessContext::new();
        let program = program(&ctx, TRIANGLE_VS);
        ctx.set_exhausted(true);
        assert_eq!(
            Geometry::triangle().upload(&ctx, Some(&program)),
            Err(BindError::BufferCreationFailed)
        );
    }
}
