//! Resource sources for the browser.

use gl3d_core::{MemorySource, ResourceError, ResourceSource};
use wasm_bindgen::JsValue;
use web_sys::XmlHttpRequest;

/// Vertex and fragment stages of the bundled mesh shader.
pub const MESH_SHADER: &str = "obj_shader";

/// Shaders compiled into the module.
pub fn builtin_shaders() -> MemorySource {
    MemorySource::new()
        .with("obj_shader.vert", include_str!("../assets/obj_shader.vert"))
        .with("obj_shader.frag", include_str!("../assets/obj_shader.frag"))
}

/// Joins a resource id onto a base URL with exactly one separator.
pub fn join_url(base: &str, id: &str) -> String {
    let base = base.trim_end_matches('/');
    let id = id.trim_start_matches('/');
    if base.is_empty() {
        id.to_string()
    } else {
        format!("{}/{}", base, id)
    }
}

/// Fetches resources relative to `base` with blocking XHR.
#[derive(Debug, Clone)]
pub struct XhrSource {
    base: String,
}

impl XhrSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn url_of(&self, id: &str) -> String {
        join_url(&self.base, id)
    }
}

fn transport(id: &str, err: JsValue) -> ResourceError {
    ResourceError::Transport {
        id: id.to_string(),
        message: err.as_string().unwrap_or_else(|| format!("{:?}", err)),
    }
}

impl ResourceSource for XhrSource {
    fn fetch_text(&self, id: &str) -> Result<String, ResourceError> {
        let url = self.url_of(id);
        let xhr = XmlHttpRequest::new().map_err(|err| transport(id, err))?;
        xhr.open_with_async("GET", &url, false)
            .map_err(|err| transport(id, err))?;
        xhr.send().map_err(|err| transport(id, err))?;

        let status = xhr.status().map_err(|err| transport(id, err))?;
        log::debug!("GET {} -> {}", url, status);
        match status {
            200..=299 => Ok(xhr
                .response_text()
                .map_err(|err| transport(id, err))?
                .unwrap_or_default()),
            404 => Err(ResourceError::NotFound { id: id.to_string() }),
            _ => Err(ResourceError::Transport {
                id: id.to_string(),
                message: format!("HTTP status {}", status),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("models", "cube.obj"), "models/cube.obj");
        assert_eq!(join_url("models/", "/cube.obj"), "models/cube.obj");
        assert_eq!(join_url("", "cube.obj"), "cube.obj");
        assert_eq!(
            XhrSource::new("https://example.com/assets/").url_of("obj_shader.vert"),
            "https://example.com/assets/obj_shader.vert"
        );
    }

    #[test]
    fn test_builtin_shaders() {
        let shaders = builtin_shaders();
        assert_eq!(shaders.len(), 2);
        let vertex = shaders.fetch_text("obj_shader.vert").unwrap();
        assert!(vertex.contains("attribute vec3 aVertexNormal;"));
        assert!(shaders.contains("obj_shader.frag"));
    }

    #[test]
    fn test_builtin_shaders_link_headless() {
        use gl3d_core::{Geometry, HeadlessContext, MeshRenderer, UniformNames};

        let ctx = HeadlessContext::new();
        let geometry = Geometry::cube_mesh(2.0)
            .to_geometry_buffer("aVertexPosition", "aVertexNormal")
            .unwrap();
        let renderer =
            MeshRenderer::from_resources(&ctx, &builtin_shaders(), MESH_SHADER, &geometry, UniformNames::default())
                .unwrap();
        assert!(renderer.program().is_linked());
    }
}
