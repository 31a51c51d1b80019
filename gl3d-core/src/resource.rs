/// Text resource sources.
///
/// Shader and mesh text is fetched synchronously through [`ResourceSource`].
/// A missing resource is reported as [`ResourceError::NotFound`], never as
/// empty text.
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MeshError, ResourceError};
use crate::mesh::Mesh;
use crate::obj;

pub trait ResourceSource {
    fn fetch_text(&self, id: &str) -> Result<String, ResourceError>;
}

impl<T: ResourceSource + ?Sized> ResourceSource for &T {
    fn fetch_text(&self, id: &str) -> Result<String, ResourceError> {
        (**self).fetch_text(id)
    }
}

/// Resources preloaded into memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(id.into(), text.into());
    }

    pub fn with(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(id, text);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetches every id from `source` up front.
    pub fn preload<R: ResourceSource + ?Sized>(
        source: &R,
        ids: &[&str],
    ) -> Result<Self, ResourceError> {
        let mut loaded = Self::new();
        for id in ids {
            loaded.insert(*id, source.fetch_text(id)?);
        }
        log::debug!("Preloaded {} resources", loaded.len());
        Ok(loaded)
    }
}

impl ResourceSource for MemorySource {
    fn fetch_text(&self, id: &str) -> Result<String, ResourceError> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound { id: id.to_string() })
    }
}

/// Resources read from files below a root directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }
}

impl ResourceSource for FileSource {
    fn fetch_text(&self, id: &str) -> Result<String, ResourceError> {
        let path = self.path_of(id);
        std::fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ResourceError::NotFound { id: id.to_string() },
            _ => ResourceError::Transport {
                id: id.to_string(),
                message: err.to_string(),
            },
        })
    }
}

/// Fetches and parses an OBJ mesh.
pub fn load_mesh<R: ResourceSource + ?Sized>(source: &R, id: &str) -> Result<Mesh, MeshError> {
    let text = source.fetch_text(id)?;
    let mesh = obj::parse_obj(&text)?;
    log::debug!(
        "Loaded mesh {}: {} vertices, {} faces",
        id,
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}
