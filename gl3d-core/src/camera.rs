/// Orbiting and first-person camera
///
/// A `Camera` is an immutable value. Azimuth rotates about the vertical z
/// axis, zenith lifts the view towards it. Every movement returns a new
/// camera; the eye position, view/up vectors and view matrix are derived once
/// at construction.
use std::f64::consts::FRAC_PI_2;

use crate::math::{Mat4, Point3H, Vec3};

/// Smallest distance between eye and observer.
pub const MIN_RADIUS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// The eye sits at the observer position.
    FirstPerson,
    /// The eye orbits the observer position at `radius`.
    ThirdPerson,
}

impl CameraMode {
    pub fn from_first_person(first_person: bool) -> Self {
        if first_person {
            CameraMode::FirstPerson
        } else {
            CameraMode::ThirdPerson
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    azimuth: f64,
    zenith: f64,
    radius: f64,
    mode: CameraMode,
    eye: Vec3,
    view_vector: Vec3,
    up_vector: Vec3,
    view_matrix: Mat4,
}

/// Direction for the given angles.
fn direction(azimuth: f64, zenith: f64) -> Vec3 {
    Vec3::new(
        azimuth.cos() * zenith.cos(),
        azimuth.sin() * zenith.cos(),
        zenith.sin(),
    )
}

impl Camera {
    /// Builds a camera, clamping zenith to [-π/2, π/2] and radius to at
    /// least [`MIN_RADIUS`].
    pub fn new(position: Vec3, azimuth: f64, zenith: f64, radius: f64, mode: CameraMode) -> Self {
        let zenith = zenith.clamp(-FRAC_PI_2, FRAC_PI_2);
        let radius = radius.max(MIN_RADIUS);

        let view_vector = direction(azimuth, zenith);
        let up_vector = direction(azimuth, zenith + FRAC_PI_2);
        let reach = view_vector.mul(radius);
        let eye = match mode {
            CameraMode::FirstPerson => position,
            CameraMode::ThirdPerson => position.add(view_vector.mul(-radius)),
        };

        Self {
            position,
            azimuth,
            zenith,
            radius,
            mode,
            eye,
            view_vector,
            up_vector,
            view_matrix: Mat4::view_rh(eye, reach, up_vector),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn zenith(&self) -> f64 {
        self.zenith
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_first_person(&self) -> bool {
        self.mode == CameraMode::FirstPerson
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn view_vector(&self) -> Vec3 {
        self.view_vector
    }

    pub fn up_vector(&self) -> Vec3 {
        self.up_vector
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn with_position(&self, position: Vec3) -> Self {
        Self::new(position, self.azimuth, self.zenith, self.radius, self.mode)
    }

    pub fn with_azimuth(&self, azimuth: f64) -> Self {
        Self::new(self.position, azimuth, self.zenith, self.radius, self.mode)
    }

    pub fn with_zenith(&self, zenith: f64) -> Self {
        Self::new(self.position, self.azimuth, zenith, self.radius, self.mode)
    }

    pub fn with_radius(&self, radius: f64) -> Self {
        Self::new(self.position, self.azimuth, self.zenith, radius, self.mode)
    }

    pub fn with_mode(&self, mode: CameraMode) -> Self {
        Self::new(self.position, self.azimuth, self.zenith, self.radius, mode)
    }

    pub fn add_azimuth(&self, angle: f64) -> Self {
        self.with_azimuth(self.azimuth + angle)
    }

    pub fn add_zenith(&self, angle: f64) -> Self {
        self.with_zenith(self.zenith + angle)
    }

    pub fn add_radius(&self, distance: f64) -> Self {
        self.with_radius(self.radius + distance)
    }

    pub fn mul_radius(&self, scale: f64) -> Self {
        self.with_radius(self.radius * scale)
    }

    /// Moves the observer by `offset`.
    pub fn move_by(&self, offset: Vec3) -> Self {
        self.with_position(self.position.add(offset))
    }

    pub fn forward(&self, speed: f64) -> Self {
        self.move_by(self.view_vector.mul(speed))
    }

    pub fn backward(&self, speed: f64) -> Self {
        self.forward(-speed)
    }

    /// Moves horizontally, perpendicular to the view direction.
    pub fn right(&self, speed: f64) -> Self {
        let side = self.azimuth - FRAC_PI_2;
        self.move_by(Vec3::new(side.cos(), side.sin(), 0.0).mul(speed))
    }

    pub fn left(&self, speed: f64) -> Self {
        self.right(-speed)
    }

    pub fn up(&self, speed: f64) -> Self {
        self.move_by(Vec3::new(0.0, 0.0, speed))
    }

    pub fn down(&self, speed: f64) -> Self {
        self.up(-speed)
    }

    /// Transforms a world point into camera space.
    pub fn to_camera_space(&self, point: Vec3) -> Vec3 {
        Point3H::from(point).mul_mat4(&self.view_matrix).ignore_w()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, 0.0, 1.0, CameraMode::FirstPerson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_default_camera_looks_along_x() {
        let camera = Camera::default();
        assert!(camera.view_vector().approx_eq(Vec3::X, EPSILON));
        assert!(camera.up_vector().approx_eq(Vec3::Z, EPSILON));
        assert!(camera.is_first_person());
        assert_eq!(camera.radius(), 1.0);
    }

    #[test]
    fn test_view_vector_from_angles() {
        let camera = Camera::default().with_azimuth(PI / 2.0).with_zenith(PI / 4.0);
        let s = (0.5f64).sqrt();
        assert!(camera.view_vector().approx_eq(Vec3::new(0.0, s, s), EPSILON));
        assert!(camera.up_vector().approx_eq(Vec3::new(0.0, -s, s), EPSILON));
        assert!((camera.view_vector().dot(camera.up_vector())).abs() < EPSILON);
    }

    #[test]
    fn test_zenith_is_clamped() {
        let mut camera = Camera::default();
        for _ in 0..20 {
            camera = camera.add_zenith(0.3);
            assert!(camera.zenith() <= FRAC_PI_2);
        }
        assert_eq!(camera.zenith(), FRAC_PI_2);
        for _ in 0..40 {
            camera = camera.add_zenith(-0.3);
            assert!(camera.zenith() >= -FRAC_PI_2);
        }
        assert_eq!(Camera::default().with_zenith(10.0).zenith(), FRAC_PI_2);
    }

    #[test]
    fn test_radius_is_clamped() {
        let camera = Camera::default();
        assert_eq!(camera.add_radius(-1000.0).radius(), MIN_RADIUS);
        assert_eq!(camera.mul_radius(0.0).radius(), MIN_RADIUS);
        assert_eq!(camera.with_radius(-3.0).radius(), MIN_RADIUS);
        assert_eq!(camera.add_radius(2.0).radius(), 3.0);
    }

    #[test]
    fn test_first_person_eye() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let camera = Camera::default().with_position(position).with_azimuth(0.3);
        assert_eq!(camera.eye(), position);
        assert!(camera
            .to_camera_space(position)
            .approx_eq(Vec3::ZERO, EPSILON));
        // The observed point lies on the negative camera z axis.
        let ahead = position.add(camera.view_vector());
        assert!(camera
            .to_camera_space(ahead)
            .approx_eq(Vec3::new(0.0, 0.0, -1.0), EPSILON));
    }

    #[test]
    fn test_third_person_orbits_observer() {
        let position = Vec3::new(1.0, 1.0, 0.0);
        let camera = Camera::new(position, PI, 0.0, 4.0, CameraMode::ThirdPerson);
        assert!(camera.eye().approx_eq(Vec3::new(5.0, 1.0, 0.0), EPSILON));
        assert!(camera
            .to_camera_space(position)
            .approx_eq(Vec3::new(0.0, 0.0, -4.0), EPSILON));
    }

    #[test]
    fn test_movement_returns_new_camera() {
        let camera = Camera::default().with_azimuth(PI / 2.0);
        let moved = camera.forward(2.0);
        assert_eq!(camera.position(), Vec3::ZERO);
        assert!(moved.position().approx_eq(Vec3::new(0.0, 2.0, 0.0), EPSILON));

        assert!(camera
            .right(1.0)
            .position()
            .approx_eq(Vec3::new(1.0, 0.0, 0.0), EPSILON));
        assert!(camera.left(1.0).right(1.0).position().approx_eq(Vec3::ZERO, EPSILON));
        assert!(camera
            .up(1.5)
            .down(0.5)
            .position()
            .approx_eq(Vec3::new(0.0, 0.0, 1.0), EPSILON));
        assert!(camera.forward(1.0).backward(1.0).position().approx_eq(Vec3::ZERO, EPSILON));
    }

    #[test]
    fn test_mode_switch_keeps_observer() {
        let camera = Camera::default()
            .with_radius(2.0)
            .with_mode(CameraMode::ThirdPerson);
        assert_eq!(camera.position(), Vec3::ZERO);
        assert!(camera.eye().approx_eq(Vec3::new(-2.0, 0.0, 0.0), EPSILON));
        assert_eq!(
            CameraMode::from_first_person(false),
            CameraMode::ThirdPerson
        );
    }
}
