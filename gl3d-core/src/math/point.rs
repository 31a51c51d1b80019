use std::ops::Mul;

use super::{Mat4, Vec3};

/// A 3D point in homogeneous coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3H {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Point3H {
    /// Affine point (`w = 1`).
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub const fn with_w_component(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_array(a: [f64; 4]) -> Self {
        Self::with_w_component(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    pub fn with_w(self, w: f64) -> Self {
        Self { w, ..self }
    }

    pub fn add(self, p: Point3H) -> Self {
        Self::with_w_component(self.x + p.x, self.y + p.y, self.z + p.z, self.w + p.w)
    }

    pub fn mul(self, d: f64) -> Self {
        Self::with_w_component(self.x * d, self.y * d, self.z * d, self.w * d)
    }

    /// Transforms the point as a row vector: `self * m`.
    pub fn mul_mat4(self, m: &Mat4) -> Self {
        let p = self.to_array();
        let mut out = [0.0; 4];
        for (j, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|i| p[i] * m[i][j]).sum();
        }
        Self::from_array(out)
    }

    /// Perspective divide. `None` for points at infinity (`w == 0`).
    pub fn dehomog(self) -> Option<Vec3> {
        if self.w == 0.0 {
            None
        } else {
            Some(Vec3::new(self.x / self.w, self.y / self.w, self.z / self.w))
        }
    }

    pub fn ignore_w(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl Default for Point3H {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<Vec3> for Point3H {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl Mul<Mat4> for Point3H {
    type Output = Point3H;

    fn mul(self, rhs: Mat4) -> Point3H {
        self.mul_mat4(&rhs)
    }
}
