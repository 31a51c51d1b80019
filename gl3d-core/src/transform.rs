//! Named transform constructors and model rotation state.
//!
//! Every constructor follows the right-handed convention with row vectors on
//! the left, so translations live in the bottom row.

use crate::math::{Mat3, Mat4, Vec2, Vec3};

impl Mat4 {
    pub const fn identity() -> Self {
        Self::from_rows_array([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed rotation about the x-axis, `alpha` in radians.
    pub fn rot_x(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(1, 1, cos)
            .with_element(2, 2, cos)
            .with_element(2, 1, -sin)
            .with_element(1, 2, sin)
    }

    /// Right-handed rotation about the y-axis, `alpha` in radians.
    pub fn rot_y(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(0, 0, cos)
            .with_element(2, 2, cos)
            .with_element(2, 0, sin)
            .with_element(0, 2, -sin)
    }

    /// Right-handed rotation about the z-axis, `alpha` in radians.
    pub fn rot_z(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(0, 0, cos)
            .with_element(1, 1, cos)
            .with_element(1, 0, -sin)
            .with_element(0, 1, sin)
    }

    /// Rotations about x, y and z chained in that order.
    pub fn rot_xyz(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self::rot_x(alpha).mul(&Self::rot_y(beta)).mul(&Self::rot_z(gamma))
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::identity()
            .with_element(0, 0, x)
            .with_element(1, 1, y)
            .with_element(2, 2, z)
    }

    pub fn scale_uniform(scale: f64) -> Self {
        Self::scale(scale, scale, scale)
    }

    pub fn scale_vec(v: Vec3) -> Self {
        Self::scale(v.x, v.y, v.z)
    }

    pub fn transl(x: f64, y: f64, z: f64) -> Self {
        Self::identity()
            .with_element(3, 0, x)
            .with_element(3, 1, y)
            .with_element(3, 2, z)
    }

    pub fn transl_vec(v: Vec3) -> Self {
        Self::transl(v.x, v.y, v.z)
    }

    /// Maps a symmetric orthographic volume of size `w` x `h` between the
    /// near and far planes onto the clip volume `[-1,1]x[-1,1]x[0,1]`.
    pub fn ortho_rh(w: f64, h: f64, zn: f64, zf: f64) -> Self {
        Self::identity()
            .with_element(0, 0, 2.0 / w)
            .with_element(1, 1, 2.0 / h)
            .with_element(2, 2, 1.0 / (zn - zf))
            .with_element(3, 2, zn / (zn - zf))
    }

    /// Maps a symmetric frustum onto the clip volume `[-1,1]x[-1,1]x[0,1]`.
    ///
    /// `alpha` is the vertical field of view in radians and `k` the
    /// height/width ratio of the volume.
    pub fn persp_rh(alpha: f64, k: f64, zn: f64, zf: f64) -> Self {
        let h = 1.0 / (alpha / 2.0).tan();
        let w = k * h;
        Self::identity()
            .with_element(0, 0, w)
            .with_element(1, 1, h)
            .with_element(2, 2, zf / (zn - zf))
            .with_element(3, 2, zn * zf / (zn - zf))
            .with_element(2, 3, -1.0)
            .with_element(3, 3, 0.0)
    }

    /// Transition into the observer frame given by eye `e`, view vector `v`
    /// and up vector `u`.
    ///
    /// The observer frame is `{e, {x, y, z}}` with `z = normalize(-v)`,
    /// `x = normalize(u × z)` and `y = z × x`. A zero view vector or an up
    /// vector parallel to it falls back to the world x-axis.
    pub fn view_rh(e: Vec3, v: Vec3, u: Vec3) -> Self {
        let z = v.opposite().normalized().unwrap_or(Vec3::X);
        let x = u.cross(z).normalized().unwrap_or(Vec3::X);
        let y = z.cross(x);
        Self::from_rows_array([
            [x.x, y.x, z.x, 0.0],
            [x.y, y.y, z.y, 0.0],
            [x.z, y.z, z.z, 0.0],
            [-e.dot(x), -e.dot(y), -e.dot(z), 1.0],
        ])
    }
}

impl Mat3 {
    pub const fn identity() -> Self {
        Self::from_rows_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    pub fn rot_x(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(1, 1, cos)
            .with_element(2, 2, cos)
            .with_element(2, 1, -sin)
            .with_element(1, 2, sin)
    }

    pub fn rot_y(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(0, 0, cos)
            .with_element(2, 2, cos)
            .with_element(2, 0, sin)
            .with_element(0, 2, -sin)
    }

    /// 2D rotation in homogeneous coordinates (rotation about z).
    pub fn rot_2d(alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self::identity()
            .with_element(0, 0, cos)
            .with_element(1, 1, cos)
            .with_element(1, 0, -sin)
            .with_element(0, 1, sin)
    }

    pub fn scale_2d(x: f64, y: f64) -> Self {
        Self::identity().with_element(0, 0, x).with_element(1, 1, y)
    }

    pub fn scale_2d_vec(v: Vec2) -> Self {
        Self::scale_2d(v.x, v.y)
    }

    pub fn transl_2d(x: f64, y: f64) -> Self {
        Self::identity().with_element(2, 0, x).with_element(2, 1, y)
    }

    pub fn transl_2d_vec(v: Vec2) -> Self {
        Self::transl_2d(v.x, v.y)
    }
}

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the state advanced by the given deltas (in radians).
    pub fn rotated(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Model matrix for this state.
    pub fn matrix(&self) -> Mat4 {
        Mat4::rot_xyz(self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3H;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn transform(p: Vec3, m: &Mat4) -> Vec3 {
        Point3H::from(p).mul_mat4(m).dehomog().unwrap()
    }

    #[test]
    fn test_rotations_are_right_handed() {
        assert!(transform(Vec3::Y, &Mat4::rot_x(FRAC_PI_2)).approx_eq(Vec3::Z, 1e-12));
        assert!(transform(Vec3::Z, &Mat4::rot_y(FRAC_PI_2)).approx_eq(Vec3::X, 1e-12));
        assert!(transform(Vec3::X, &Mat4::rot_z(FRAC_PI_2)).approx_eq(Vec3::Y, 1e-12));
    }

    #[test]
    fn test_rot_xyz_chains_in_order() {
        let expected = Mat4::rot_x(0.1).mul(&Mat4::rot_y(0.2)).mul(&Mat4::rot_z(0.3));
        assert_eq!(Mat4::rot_xyz(0.1, 0.2, 0.3), expected);
    }

    #[test]
    fn test_perspective_quarter_turn() {
        let m = Mat4::persp_rh(FRAC_PI_2, 1.0, 1.0, 100.0);
        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!((m[1][1] - 1.0).abs() < 1e-12);
        assert_eq!(m[2][3], -1.0);
        assert_eq!(m[3][3], 0.0);
        assert!((m[2][2] - 100.0 / -99.0).abs() < 1e-12);
        assert!((m[3][2] - 100.0 / -99.0).abs() < 1e-12);
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth_range() {
        let m = Mat4::persp_rh(PI / 3.0, 1.0, 1.0, 60.0);
        let near = Point3H::new(0.0, 0.0, -1.0).mul_mat4(&m).dehomog().unwrap();
        let far = Point3H::new(0.0, 0.0, -60.0).mul_mat4(&m).dehomog().unwrap();
        assert!(near.z.abs() < 1e-12);
        assert!((far.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ortho_depth_range() {
        let m = Mat4::ortho_rh(4.0, 2.0, 0.5, 10.0);
        assert!(transform(Vec3::new(0.0, 0.0, -0.5), &m).z.abs() < 1e-12);
        assert!((transform(Vec3::new(0.0, 0.0, -10.0), &m).z - 1.0).abs() < 1e-12);
        assert!(transform(Vec3::new(2.0, 1.0, -1.0), &m).approx_eq(
            Vec3::new(1.0, 1.0, transform(Vec3::new(0.0, 0.0, -1.0), &m).z),
            1e-12
        ));
    }

    #[test]
    fn test_view_moves_eye_to_origin_looking_down_negative_z() {
        let eye = Vec3::new(3.0, -2.0, 5.0);
        let view = Vec3::new(0.0, 1.0, 0.0);
        let m = Mat4::view_rh(eye, view, Vec3::Z);
        assert!(transform(eye, &m).approx_eq(Vec3::ZERO, 1e-12));
        assert!(transform(eye + view * 4.0, &m).approx_eq(Vec3::new(0.0, 0.0, -4.0), 1e-12));
        assert!(transform(eye + Vec3::Z, &m).approx_eq(Vec3::Y, 1e-12));
    }

    #[test]
    fn test_view_falls_back_on_degenerate_input() {
        let zero_view = Mat4::view_rh(Vec3::ZERO, Vec3::ZERO, Vec3::Z);
        assert!(zero_view.as_rows().iter().flatten().all(|v| v.is_finite()));

        let parallel_up = Mat4::view_rh(Vec3::ZERO, Vec3::Z, Vec3::Z);
        assert!(parallel_up.as_rows().iter().flatten().all(|v| v.is_finite()));
        assert_eq!(parallel_up.column(0).ignore_w(), Vec3::X);
    }

    #[test]
    fn test_mat3_2d_transforms() {
        let p = Vec3::new(1.0, 0.0, 1.0);
        let moved = p.mul_mat3(&Mat3::rot_2d(FRAC_PI_2).mul(&Mat3::transl_2d(2.0, 3.0)));
        assert!(moved.approx_eq(Vec3::new(2.0, 4.0, 1.0), 1e-12));
        let scaled = p.mul_mat3(&Mat3::scale_2d_vec(Vec2::new(3.0, 1.0)));
        assert_eq!(scaled, Vec3::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn test_rotation_state() {
        let state = RotationState::default();
        assert_eq!(state.matrix(), Mat4::identity());

        let state = state.rotated(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-12);
        assert!((state.y - 0.2).abs() < 1e-12);
        assert!((state.z - 0.3).abs() < 1e-12);
        assert_eq!(state.matrix(), Mat4::rot_xyz(0.1, 0.2, 0.3));
    }
}
