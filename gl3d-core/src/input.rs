/// Pointer and key input mapped onto camera movement.
///
/// Hosts feed raw pointer positions and key identifiers; the mapping turns
/// them into new [`Camera`] values.
use std::f64::consts::PI;

use crate::camera::Camera;

/// Pointer movement while a button is held, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragDelta {
    pub dx: f64,
    pub dy: f64,
}

/// Turns raw pointer positions into drag deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragTracker {
    dragging: bool,
    last_x: f64,
    last_y: f64,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Starts a drag at the given position.
    pub fn press(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last_x = x;
        self.last_y = y;
    }

    /// Records a pointer move; yields a delta only while dragging.
    pub fn move_to(&mut self, x: f64, y: f64) -> Option<DragDelta> {
        let delta = DragDelta {
            dx: x - self.last_x,
            dy: y - self.last_y,
        };
        self.last_x = x;
        self.last_y = y;
        self.dragging.then_some(delta)
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }
}

/// Camera movement bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKey {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    ZoomIn,
    ZoomOut,
}

impl CameraKey {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(CameraKey::Forward),
            's' => Some(CameraKey::Backward),
            'a' => Some(CameraKey::Left),
            'd' => Some(CameraKey::Right),
            'e' => Some(CameraKey::Up),
            'q' => Some(CameraKey::Down),
            '-' => Some(CameraKey::ZoomIn),
            '+' | '=' => Some(CameraKey::ZoomOut),
            _ => None,
        }
    }

    /// Maps a DOM-style key name such as `"w"` or `"+"`.
    pub fn from_key_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }
}

/// Input sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraControls {
    /// Distance per movement key press.
    pub move_speed: f64,
    /// Radians turned by dragging across the full surface width.
    pub drag_scale: f64,
    /// Radius change per zoom key press.
    pub radius_step: f64,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            drag_scale: PI,
            radius_step: 0.5,
        }
    }
}

impl CameraControls {
    /// Turns the camera by a drag across a surface `width` pixels wide.
    /// Both axes are scaled by the width.
    pub fn apply_drag(&self, camera: &Camera, delta: DragDelta, width: f64) -> Camera {
        if width <= 0.0 {
            return *camera;
        }
        camera
            .add_azimuth(self.drag_scale * delta.dx / width)
            .add_zenith(self.drag_scale * delta.dy / width)
    }

    pub fn apply_key(&self, camera: &Camera, key: CameraKey) -> Camera {
        let speed = self.move_speed;
        match key {
            CameraKey::Forward => camera.forward(speed),
            CameraKey::Backward => camera.backward(speed),
            CameraKey::Left => camera.left(speed),
            CameraKey::Right => camera.right(speed),
            CameraKey::Up => camera.up(speed),
            CameraKey::Down => camera.down(speed),
            CameraKey::ZoomIn => camera.add_radius(-self.radius_step),
            CameraKey::ZoomOut => camera.add_radius(self.radius_step),
        }
    }

    /// Applies the movement bound to `c`, if any.
    pub fn handle_char(&self, camera: &Camera, c: char) -> Option<Camera> {
        CameraKey::from_char(c).map(|key| self.apply_key(camera, key))
    }
}
