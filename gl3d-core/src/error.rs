//! Error kinds surfaced by the pipeline.
//!
//! Degenerate transforms are not listed here: `normalized()`, `inverse()` and
//! `dehomog()` return `Option` and callers substitute a default.

use crate::shader::ShaderStage;

/// A text resource could not be retrieved.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("resource not found: {id}")]
    NotFound { id: String },

    #[error("failed to fetch resource {id}: {message}")]
    Transport { id: String, message: String },
}

/// Failures while turning shader sources into a program in use.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("resource {0} is not a shader")]
    NotAShader(String),

    #[error("resource {resource} does not name a {expected} shader")]
    StageMismatch {
        expected: ShaderStage,
        resource: String,
    },

    #[error("shader source unavailable: {0}")]
    ResourceUnavailable(#[from] ResourceError),

    #[error("the context returned no {0} shader object")]
    ShaderCreationFailed(ShaderStage),

    #[error("{stage} shader failed to compile: {log}")]
    CompileFailed { stage: ShaderStage, log: String },

    #[error("the context returned no program object")]
    ProgramCreationFailed,

    #[error("program failed to link: {log}")]
    LinkFailed { log: String },

    #[error("program is not linked")]
    ProgramNotLinked,
}

/// Failures while uploading geometry and binding its attribute layout.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("cannot bind attributes without a program")]
    NoProgram,

    #[error("cannot bind attributes to a program that is not linked")]
    ProgramNotLinked,

    #[error("program has no active attribute named {name}")]
    AttributeNotFound { name: String },

    #[error("attribute {name} has an invalid layout: {reason}")]
    InvalidLayout { name: String, reason: String },

    #[error("index {index} addresses past the {vertices} vertices in the streams")]
    IndexOutOfRange { index: u16, vertices: usize },

    #[error("the context returned no buffer object")]
    BufferCreationFailed,
}

/// Failures while parsing or exporting mesh data.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("malformed mesh data on line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("face {face} references vertex {index} but the mesh has {vertices} vertices")]
    VertexOutOfBounds {
        face: usize,
        index: u32,
        vertices: usize,
    },

    #[error("index {index} does not fit the index buffer (max {max})")]
    IndexRangeExceeded { index: usize, max: usize },

    #[error("mesh source unavailable: {0}")]
    ResourceUnavailable(#[from] ResourceError),
}

/// Failures while creating or binding textures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TextureError {
    #[error("the context returned no texture object")]
    CreationFailed,

    #[error("texture unit {0} is out of range (0..=31)")]
    UnitOutOfRange(u32),

    #[error("expected {expected} bytes of RGBA data, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Any error produced by this crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
