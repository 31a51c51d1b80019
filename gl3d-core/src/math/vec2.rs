use std::ops::{Add, Mul, Neg, Sub};

/// A 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `value`.
    pub const fn splat(value: f64) -> Self {
        Self { x: value, y: value }
    }

    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn add(self, v: Vec2) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }

    pub fn sub(self, v: Vec2) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }

    pub fn mul(self, d: f64) -> Self {
        Self::new(self.x * d, self.y * d)
    }

    /// Component-wise product.
    pub fn mul_vec(self, v: Vec2) -> Self {
        Self::new(self.x * v.x, self.y * v.y)
    }

    pub fn dot(self, v: Vec2) -> f64 {
        self.x * v.x + self.y * v.y
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, `None` for a zero-length or
    /// non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let scale = self.x.abs().max(self.y.abs());
        if scale == 0.0 || !scale.is_finite() {
            return None;
        }
        let v = Self::new(self.x / scale, self.y / scale);
        let len = v.length();
        Some(Self::new(v.x / len, v.y / len))
    }

    pub fn opposite(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::add(self, rhs)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::sub(self, rhs)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::mul(self, rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        self.opposite()
    }
}
