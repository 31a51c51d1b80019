/// GL3D Core Library - Shared rendering pipeline logic
///
/// This library provides the platform independent part of the renderer:
/// linear algebra and camera transforms, OBJ parsing with normal
/// reconstruction, shader program compilation, vertex buffer binding and the
/// host-driven frame loop. GPU access goes through the `GpuContext` trait.
pub mod buffer;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod interop;
pub mod math;
pub mod mesh;
pub mod obj;
pub mod projection;
pub mod renderer;
pub mod resource;
pub mod shader;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use buffer::{upload, BufferHandles, GeometryBuffer, VertexAttribute};
pub use camera::{Camera, CameraMode};
pub use config::ViewConfig;
pub use error::{BindError, Error, MeshError, ResourceError, Result, ShaderError, TextureError};
pub use frame::{schedule_next_frame, FrameClock, FrameControl, FrameLoop, FrameScheduler, FrameTime, LoopSwitch, ManualScheduler};
pub use geometry::Geometry;
pub use gpu::{GpuContext, HeadlessContext};
pub use input::{CameraControls, CameraKey, DragDelta, DragTracker};
pub use math::{Mat3, Mat4, Point3H, Vec2, Vec3};
pub use mesh::{compute_vertex_normals, Mesh};
pub use obj::{parse_obj, parse_obj_source};
pub use projection::{project_to_screen, Projection, ProjectionMode};
pub use renderer::{MeshRenderer, UniformNames};
pub use resource::{load_mesh, FileSource, MemorySource, ResourceSource};
pub use shader::{check_shader_resources, load_shaders, load_shaders_by_name, ProgramState, ShaderPair, ShaderProgram, ShaderStage};
pub use texture::Texture2d;
pub use transform::RotationState;
