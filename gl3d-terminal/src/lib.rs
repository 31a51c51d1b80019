/// Terminal front end: ASCII rendering of a mesh with camera controls
use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use gl3d_core::{
    load_mesh, Camera, CameraControls, CameraKey, CameraMode, DragTracker, FileSource, FrameControl, FrameLoop, FrameTime,
    Geometry, ManualScheduler, Mat4, Mesh, Projection, RotationState, Vec3, ViewConfig,
};
use std::cell::RefCell;
use std::fs;
use std::io::{self, stdout, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub mod logging;
pub mod renderer;

pub use logging::{init_logging, LoggingConfig};
pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: u32 = 2;

/// Model rotation speed around x and z in radians per second.
const SPIN_SPEED: (f64, f64) = (0.3, 0.45);

/// Model rotation per arrow key press in radians.
const ROTATE_STEP: f64 = 0.1;

/// Reads a view config, `None` when the file does not exist.
pub fn load_config(path: &Path) -> Result<Option<ViewConfig>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("failed to read {}", path.display())),
    };
    let config = ViewConfig::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))?;
    log::info!("Loaded view config from {}", path.display());
    Ok(Some(config))
}

/// Loads an OBJ file, or the default cube when no path is given.
pub fn load_mesh_or_cube(path: Option<&Path>) -> Result<Mesh> {
    let Some(path) = path else {
        return Ok(Geometry::cube_mesh(2.0));
    };
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    let mesh = load_mesh(&FileSource::new(root), name).with_context(|| format!("failed to load {}", path.display()))?;
    log::info!("Loaded {} vertices, {} faces from {}", mesh.vertex_count(), mesh.face_count(), path.display());
    Ok(mesh)
}

/// Headroom around the mesh when framing it.
const FRAMING_MARGIN: f64 = 1.2;

/// Camera orbiting the (centred) mesh from far enough to show all of it.
pub fn framing_camera(mesh: &Mesh, config: &ViewConfig) -> Camera {
    let (min, max) = mesh.bounds().unwrap_or((Vec3::ZERO, Vec3::ZERO));
    let half_diagonal = max.sub(min).length() / 2.0;
    let distance = (FRAMING_MARGIN * half_diagonal / (config.fov / 2.0).sin()).max(half_diagonal + config.near * 2.0);
    Camera::new(Vec3::ZERO, config.azimuth, config.zenith, distance, CameraMode::ThirdPerson)
}

/// Mutable per-frame state, shared with the frame loop callback.
struct AppState {
    mesh: Mesh,
    centering: Mat4,
    rotation: RotationState,
    spinning: bool,
    camera: Camera,
    projection: Projection,
    controls: CameraControls,
    drag: DragTracker,
    renderer: AsciiRenderer,
    running: bool,
    fps: f64,
    fps_frames: u32,
    fps_since: f64,
    error: Option<io::Error>,
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    state: AppState,
    target_fps: u32,
}

impl TerminalApp {
    /// Sets up the camera and projection from `config`, and centres the mesh
    /// on the origin so it spins in place.
    pub fn new(mesh: Mesh, config: &ViewConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(mesh, config, width, height))
    }

    fn with_size(mesh: Mesh, config: &ViewConfig, width: u16, height: u16) -> Self {
        let centering = match mesh.bounds() {
            Some((min, max)) => Mat4::transl_vec(min.add(max).mul(-0.5)),
            None => Mat4::identity(),
        };

        Self {
            state: AppState {
                mesh,
                centering,
                rotation: RotationState::default(),
                spinning: true,
                camera: config.camera(),
                projection: viewport_projection(config.projection(), width, height),
                controls: config.controls(),
                drag: DragTracker::new(),
                renderer: AsciiRenderer::new(width as usize, height as usize),
                running: true,
                fps: 0.0,
                fps_frames: 0,
                fps_since: 0.0,
                error: None,
            },
            target_fps: config.target_fps.max(1),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.state.camera = camera;
        self
    }

    pub fn run(self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(self) -> Result<()> {
        let target_frame_time = Duration::from_secs_f64(1.0 / self.target_fps as f64);
        let scheduler = Rc::new(ManualScheduler::new());
        let state = Rc::new(RefCell::new(self.state));

        let frame_state = Rc::clone(&state);
        FrameLoop::start_timed(Rc::clone(&scheduler), move |time| frame_state.borrow_mut().frame(time));

        let start = Instant::now();
        while scheduler.pending() > 0 {
            let frame_start = Instant::now();
            scheduler.run_frame(start.elapsed().as_secs_f64() * 1000.0);

            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        let error = state.borrow_mut().error.take();
        match error {
            Some(err) => Err(err).context("terminal frame failed"),
            None => Ok(()),
        }
    }
}

fn viewport_projection(projection: Projection, width: u16, height: u16) -> Projection {
    projection.with_viewport(width as u32, height as u32 * CELL_ASPECT)
}

impl AppState {
    fn frame(&mut self, time: FrameTime) -> FrameControl {
        let result = self.handle_input().and_then(|()| {
            self.update(time);
            self.render()
        });
        if let Err(err) = result {
            log::error!("Frame {} failed: {}", time.frame_index, err);
            self.error = Some(err);
            self.running = false;
        }

        if self.running {
            FrameControl::Continue
        } else {
            FrameControl::Stop
        }
    }

    fn handle_input(&mut self) -> io::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, .. }: KeyEvent) {
        match code {
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c' | 'C') if modifiers.contains(KeyModifiers::CONTROL) => self.running = false,
            KeyCode::Char('p' | 'P') => {
                self.projection = self.projection.toggled();
                log::debug!("Projection mode {:?}", self.projection.mode);
            }
            KeyCode::Char('r' | 'R') => self.spinning = !self.spinning,
            KeyCode::Char('c' | 'C') => {
                let mode = match self.camera.mode() {
                    CameraMode::FirstPerson => CameraMode::ThirdPerson,
                    CameraMode::ThirdPerson => CameraMode::FirstPerson,
                };
                self.camera = self.camera.with_mode(mode);
            }
            KeyCode::Char(c) => {
                if let Some(camera) = self.controls.handle_char(&self.camera, c) {
                    self.camera = camera;
                }
            }
            KeyCode::Up => self.rotation = self.rotation.rotated(ROTATE_STEP, 0.0, 0.0),
            KeyCode::Down => self.rotation = self.rotation.rotated(-ROTATE_STEP, 0.0, 0.0),
            KeyCode::Left => self.rotation = self.rotation.rotated(0.0, 0.0, -ROTATE_STEP),
            KeyCode::Right => self.rotation = self.rotation.rotated(0.0, 0.0, ROTATE_STEP),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let (x, y) = (column as f64, row as f64 * CELL_ASPECT as f64);
        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.drag.press(x, y),
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(delta) = self.drag.move_to(x, y) {
                    let (width, _) = self.renderer.size();
                    self.camera = self.controls.apply_drag(&self.camera, delta, width as f64);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag.release(),
            MouseEventKind::ScrollUp => self.camera = self.controls.apply_key(&self.camera, CameraKey::ZoomIn),
            MouseEventKind::ScrollDown => self.camera = self.controls.apply_key(&self.camera, CameraKey::ZoomOut),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.renderer.resize(width as usize, height as usize);
        self.projection = viewport_projection(self.projection, width, height);
        log::debug!("Resized to {}x{}", width, height);
    }

    fn update(&mut self, time: FrameTime) {
        if self.spinning {
            self.rotation = self.rotation.rotated(SPIN_SPEED.0 * time.dt, 0.0, SPIN_SPEED.1 * time.dt);
        }

        self.fps_frames += 1;
        let window = time.timestamp - self.fps_since;
        if window >= 1000.0 {
            self.fps = self.fps_frames as f64 * 1000.0 / window;
            self.fps_frames = 0;
            self.fps_since = time.timestamp;
        }
    }

    fn model(&self) -> Mat4 {
        self.centering.mul(&self.rotation.matrix())
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.model();
        self.renderer.clear();
        self.renderer.render_mesh(&self.mesh, &model, &self.camera, &self.projection.matrix());

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "GL3D Terminal | FPS: {:.1} | {:?} | WASD/QE=Move +/-=Zoom Drag=Look Arrows=Rotate P=Projection C=Camera R=Spin Esc=Quit",
                self.fps, self.projection.mode
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl3d_core::ProjectionMode;

    fn app() -> TerminalApp {
        let config = ViewConfig::default();
        let mesh = Geometry::cube_mesh(2.0);
        let camera = framing_camera(&mesh, &config);
        TerminalApp::with_size(mesh, &config, 80, 24).with_camera(camera)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_framing_camera_sees_mesh() {
        let mut state = app().state;
        let model = state.model();
        let projection = state.projection.matrix();
        let drawn = state
            .renderer
            .render_mesh(&state.mesh, &model, &state.camera, &projection);
        assert_eq!(drawn, 12);
        assert_eq!(state.renderer.char_at(0, 0), Some(' '));
    }

    #[test]
    fn test_projection_follows_cell_aspect() {
        let state = app().state;
        assert!((state.projection.ratio - 48.0 / 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_quit_keys() {
        let mut state = app().state;
        state.handle_key(key(KeyCode::Char('w')));
        assert!(state.running);

        state.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!state.running);

        let mut state = app().state;
        state.handle_key(key(KeyCode::Esc));
        assert!(!state.running);
    }

    #[test]
    fn test_keys_drive_camera_and_projection() {
        let mut state = app().state;
        let before = state.camera;
        state.handle_key(key(KeyCode::Char('-')));
        assert!(state.camera.radius() < before.radius());

        state.handle_key(key(KeyCode::Char('p')));
        assert_eq!(state.projection.mode, ProjectionMode::Orthographic);

        state.handle_key(key(KeyCode::Char('c')));
        assert_eq!(state.camera.mode(), CameraMode::FirstPerson);

        state.handle_key(key(KeyCode::Up));
        assert_eq!(state.rotation.x, ROTATE_STEP);
    }

    #[test]
    fn test_shifted_keys_match_lowercase() {
        let mut state = app().state;
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        let spinning = state.spinning;

        state.handle_key(shifted('P'));
        assert_eq!(state.projection.mode, ProjectionMode::Orthographic);

        state.handle_key(shifted('R'));
        assert_eq!(state.spinning, !spinning);

        state.handle_key(shifted('C'));
        assert_eq!(state.camera.mode(), CameraMode::FirstPerson);
        assert!(state.running);

        state.handle_key(KeyEvent::new(
            KeyCode::Char('C'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ));
        assert!(!state.running);
    }

    #[test]
    fn test_drag_turns_camera() {
        let mut state = app().state;
        let before = state.camera.azimuth();
        let mouse = |kind| MouseEvent {
            kind,
            column: 10,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        state.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left)));
        state.handle_mouse(MouseEvent {
            column: 50,
            ..mouse(MouseEventKind::Drag(MouseButton::Left))
        });
        state.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left)));

        assert!((state.camera.azimuth() - before - std::f64::consts::PI / 2.0).abs() < 1e-9);
        assert!(!state.drag.is_dragging());
    }

    #[test]
    fn test_spin_uses_frame_time() {
        let mut state = app().state;
        state.update(FrameTime {
            dt: 0.5,
            timestamp: 500.0,
            frame_index: 1,
        });
        assert!((state.rotation.x - 0.15).abs() < 1e-12);

        state.spinning = false;
        state.update(FrameTime {
            dt: 0.5,
            timestamp: 1000.0,
            frame_index: 2,
        });
        assert!((state.rotation.x - 0.15).abs() < 1e-12);
        assert!((state.fps - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_config_missing_file() {
        let path = std::env::temp_dir().join("gl3d-terminal-missing-config.toml");
        assert!(load_config(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_mesh_or_cube() {
        assert_eq!(load_mesh_or_cube(None).unwrap().face_count(), 12);

        let dir = std::env::temp_dir().join("gl3d-terminal-mesh-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tri.obj");
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let mesh = load_mesh_or_cube(Some(&path)).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert!(load_mesh_or_cube(Some(&dir.join("absent.obj"))).is_err());
    }
}
