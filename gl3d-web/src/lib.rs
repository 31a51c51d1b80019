/// GL3D Web - WebGL mesh viewer compiled to WASM
///
/// `WebRenderer` loads an OBJ mesh over XHR, draws it with the bundled
/// shader on a `<canvas>` and turns the camera from mouse drags and keys.
/// Frames are paced by `requestAnimationFrame`.
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use gl3d_core::{
    load_mesh, Camera, CameraControls, CameraKey, DragTracker, FrameControl, FrameLoop, FrameTime, GpuContext,
    LoopSwitch, MeshRenderer, Projection, RotationState, ViewConfig,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

pub mod context;
pub mod resource;
pub mod scheduler;

pub use context::WebGlContext;
pub use resource::{builtin_shaders, join_url, XhrSource, MESH_SHADER};
pub use scheduler::AnimationFrameScheduler;

/// Attribute names the bundled shader declares.
const POSITION_ATTRIBUTE: &str = "aVertexPosition";
const NORMAL_ATTRIBUTE: &str = "aVertexNormal";

const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.12, 1.0];

/// Model spin around z in radians per second.
const SPIN_SPEED: f64 = 0.3;

fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct Viewer {
    ctx: WebGlContext,
    renderer: MeshRenderer<WebGlContext>,
    camera: Camera,
    projection: Projection,
    controls: CameraControls,
    drag: DragTracker,
    rotation: RotationState,
    spinning: bool,
    width: u32,
    switch: LoopSwitch,
}

impl Viewer {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.ctx.viewport(0, 0, width as i32, height as i32);
        self.projection = self.projection.with_viewport(width, height);
    }

    fn draw(&mut self) -> gl3d_core::Result<()> {
        self.ctx.clear(CLEAR_COLOR);
        let projection = self.projection.matrix();
        self.renderer
            .draw(&self.ctx, &self.camera, &projection, &self.rotation.matrix())
    }

    fn frame(&mut self, time: FrameTime) -> FrameControl {
        if self.spinning {
            self.rotation = self.rotation.rotated(0.0, 0.0, SPIN_SPEED * time.dt);
        }
        match self.draw() {
            Ok(()) => FrameControl::Continue,
            Err(err) => {
                log::error!("Frame {} failed: {}", time.frame_index, err);
                self.switch.stop();
                FrameControl::Stop
            }
        }
    }
}

#[wasm_bindgen]
pub struct WebRenderer {
    viewer: Rc<RefCell<Viewer>>,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Creates a viewer on the canvas `canvas_id` for the OBJ file at
    /// `base_url/mesh`. `config` is optional TOML view configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, base_url: &str, mesh: &str, config: Option<String>) -> Result<WebRenderer, JsValue> {
        let config = match config {
            Some(text) => ViewConfig::from_toml_str(&text).map_err(js_error)?,
            None => ViewConfig::default(),
        };

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| js_error("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| js_error(format!("no element #{}", canvas_id)))?
            .dyn_into()
            .map_err(|_| js_error(format!("#{} is not a canvas", canvas_id)))?;
        let gl: WebGl2RenderingContext = canvas
            .get_context("webgl2")?
            .ok_or_else(|| js_error("WebGL2 is not available"))?
            .dyn_into()?;

        let ctx = WebGlContext::new(gl);
        ctx.enable_depth_test();

        let mesh = load_mesh(&XhrSource::new(base_url), mesh).map_err(js_error)?;
        let geometry = mesh
            .to_geometry_buffer(POSITION_ATTRIBUTE, NORMAL_ATTRIBUTE)
            .map_err(js_error)?;
        let renderer = MeshRenderer::from_resources(
            &ctx,
            &builtin_shaders(),
            MESH_SHADER,
            &geometry,
            config.uniforms.clone(),
        )
        .map_err(js_error)?;
        log::info!("Viewer ready: {} faces", mesh.face_count());

        let mut viewer = Viewer {
            ctx,
            renderer,
            camera: config.camera(),
            projection: config.projection(),
            controls: config.controls(),
            drag: DragTracker::new(),
            rotation: RotationState::default(),
            spinning: false,
            width: 0,
            switch: LoopSwitch::new(),
        };
        viewer.resize(canvas.width(), canvas.height());

        Ok(WebRenderer {
            viewer: Rc::new(RefCell::new(viewer)),
        })
    }

    /// Starts the animation loop. Does nothing when already running.
    ///
    /// A frame still pending from an earlier stopped loop ends that loop,
    /// so stop followed by start leaves a single loop.
    pub fn start(&self) -> Result<(), JsValue> {
        let switch = self.viewer.borrow().switch.clone();
        if switch.is_running() {
            return Ok(());
        }
        let scheduler = Rc::new(AnimationFrameScheduler::new()?);
        let viewer = Rc::clone(&self.viewer);
        FrameLoop::start_switched(scheduler, &switch, move |time| viewer.borrow_mut().frame(time));
        Ok(())
    }

    /// Ends the animation loop; its pending frame draws nothing.
    pub fn stop(&self) {
        self.viewer.borrow().switch.stop();
    }

    /// Draws a single frame outside the loop.
    pub fn render(&self) -> Result<(), JsValue> {
        self.viewer.borrow_mut().draw().map_err(js_error)
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.viewer.borrow_mut().resize(width, height);
    }

    pub fn set_spinning(&self, spinning: bool) {
        self.viewer.borrow_mut().spinning = spinning;
    }

    pub fn mouse_down(&self, x: f64, y: f64) {
        self.viewer.borrow_mut().drag.press(x, y);
    }

    pub fn mouse_move(&self, x: f64, y: f64) {
        let mut viewer = self.viewer.borrow_mut();
        if let Some(delta) = viewer.drag.move_to(x, y) {
            let width = viewer.width as f64;
            viewer.camera = viewer.controls.apply_drag(&viewer.camera, delta, width);
        }
    }

    pub fn mouse_up(&self) {
        self.viewer.borrow_mut().drag.release();
    }

    /// Handles a `KeyboardEvent.key` value. Returns whether it was used.
    pub fn key(&self, name: &str) -> bool {
        let mut viewer = self.viewer.borrow_mut();
        if name.eq_ignore_ascii_case("p") {
            viewer.projection = viewer.projection.toggled();
            return true;
        }
        match CameraKey::from_key_name(name) {
            Some(key) => {
                viewer.camera = viewer.controls.apply_key(&viewer.camera, key);
                true
            }
            None => false,
        }
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(js_error)?;
    Ok(())
}
