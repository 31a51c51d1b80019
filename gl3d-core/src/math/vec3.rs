use std::ops::{Add, Mul, Neg, Sub};

use super::{Mat3, Point3H, Vec2};

/// A 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn from_array(a: [f64; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
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

    /// Drops the z component.
    pub fn ignore_z(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn add(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    pub fn sub(self, v: Vec3) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }

    pub fn mul(self, d: f64) -> Self {
        Self::new(self.x * d, self.y * d, self.z * d)
    }

    /// Component-wise product.
    pub fn mul_vec(self, v: Vec3) -> Self {
        Self::new(self.x * v.x, self.y * v.y, self.z * v.z)
    }

    /// Row vector times matrix.
    pub fn mul_mat3(self, m: &Mat3) -> Self {
        Self::new(
            m[0][0] * self.x + m[1][0] * self.y + m[2][0] * self.z,
            m[0][1] * self.x + m[1][1] * self.y + m[2][1] * self.z,
            m[0][2] * self.x + m[1][2] * self.y + m[2][2] * self.z,
        )
    }

    pub fn dot(self, v: Vec3) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn cross(self, v: Vec3) -> Self {
        Self::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, `None` for a zero-length or
    /// non-finite vector.
    ///
    /// Components are scaled by the largest magnitude first so the squared
    /// length neither overflows nor underflows.
    pub fn normalized(self) -> Option<Self> {
        let scale = self.x.abs().max(self.y.abs()).max(self.z.abs());
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let v = Self::new(self.x / scale, self.y / scale, self.z / scale);
        let len = v.length();
        Some(Self::new(v.x / len, v.y / len, v.z / len))
    }

    pub fn opposite(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn approx_eq(self, other: Vec3, eps: f64) -> bool {
        super::approx_eq(self.x, other.x, eps)
            && super::approx_eq(self.y, other.y, eps)
            && super::approx_eq(self.z, other.z, eps)
    }
}

impl From<Point3H> for Vec3 {
    fn from(p: Point3H) -> Self {
        p.ignore_w()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::add(self, rhs)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::sub(self, rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::mul(self, rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        self.opposite()
    }
}
