use std::ops::Index;

use super::Point3H;

/// A row-major 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat4 {
    m: [[f64; 4]; 4],
}

impl Mat4 {
    /// Matrix with every element set to `value`.
    pub const fn filled(value: f64) -> Self {
        Self { m: [[value; 4]; 4] }
    }

    pub const fn from_rows_array(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Builds a matrix from its four row vectors.
    pub fn from_rows(r0: Point3H, r1: Point3H, r2: Point3H, r3: Point3H) -> Self {
        Self::from_rows_array([r0.to_array(), r1.to_array(), r2.to_array(), r3.to_array()])
    }

    /// Builds a matrix from 16 elements in row-major order.
    pub fn from_slice(values: &[f64; 16]) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(&values[i * 4..i * 4 + 4]);
        }
        Self { m }
    }

    pub fn as_rows(&self) -> &[[f64; 4]; 4] {
        &self.m
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.m[row][column]
    }

    pub fn row(&self, row: usize) -> Point3H {
        Point3H::from_array(self.m[row])
    }

    pub fn column(&self, column: usize) -> Point3H {
        Point3H::with_w_component(
            self.m[0][column],
            self.m[1][column],
            self.m[2][column],
            self.m[3][column],
        )
    }

    pub fn with_element(&self, row: usize, column: usize, value: f64) -> Self {
        let mut m = self.m;
        m[row][column] = value;
        Self { m }
    }

    pub fn add(&self, other: &Mat4) -> Self {
        let mut m = self.m;
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value += other.m[i][j];
            }
        }
        Self { m }
    }

    pub fn mul_scalar(&self, d: f64) -> Self {
        let mut m = self.m;
        m.iter_mut().flatten().for_each(|value| *value *= d);
        Self { m }
    }

    /// Matrix product `self * other`; `self` is applied first to row vectors.
    pub fn mul(&self, other: &Mat4) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Self { m }
    }

    pub fn transpose(&self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.m[j][i];
            }
        }
        Self { m }
    }

    /// 2x2 minors of the upper (`s`) and lower (`c`) row pairs.
    fn minors(&self) -> ([f64; 6], [f64; 6]) {
        let m = &self.m;
        let s = [
            m[0][0] * m[1][1] - m[1][0] * m[0][1],
            m[0][0] * m[1][2] - m[1][0] * m[0][2],
            m[0][0] * m[1][3] - m[1][0] * m[0][3],
            m[0][1] * m[1][2] - m[1][1] * m[0][2],
            m[0][1] * m[1][3] - m[1][1] * m[0][3],
            m[0][2] * m[1][3] - m[1][2] * m[0][3],
        ];
        let c = [
            m[2][0] * m[3][1] - m[3][0] * m[2][1],
            m[2][0] * m[3][2] - m[3][0] * m[2][2],
            m[2][0] * m[3][3] - m[3][0] * m[2][3],
            m[2][1] * m[3][2] - m[3][1] * m[2][2],
            m[2][1] * m[3][3] - m[3][1] * m[2][3],
            m[2][2] * m[3][3] - m[3][2] * m[2][3],
        ];
        (s, c)
    }

    fn det_from_minors(s: &[f64; 6], c: &[f64; 6]) -> f64 {
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    pub fn det(&self) -> f64 {
        let (s, c) = self.minors();
        Self::det_from_minors(&s, &c)
    }

    /// Inverse via Laplace expansion over 2x2 minors. `None` when the
    /// determinant is exactly zero.
    pub fn inverse(&self) -> Option<Self> {
        let (s, c) = self.minors();
        let det = Self::det_from_minors(&s, &c);
        if det == 0.0 {
            return None;
        }
        let i_det = 1.0 / det;
        let m = &self.m;

        let mut r = [[0.0; 4]; 4];
        r[0][0] = (m[1][1] * c[5] - m[1][2] * c[4] + m[1][3] * c[3]) * i_det;
        r[0][1] = (-m[0][1] * c[5] + m[0][2] * c[4] - m[0][3] * c[3]) * i_det;
        r[0][2] = (m[3][1] * s[5] - m[3][2] * s[4] + m[3][3] * s[3]) * i_det;
        r[0][3] = (-m[2][1] * s[5] + m[2][2] * s[4] - m[2][3] * s[3]) * i_det;

        r[1][0] = (-m[1][0] * c[5] + m[1][2] * c[2] - m[1][3] * c[1]) * i_det;
        r[1][1] = (m[0][0] * c[5] - m[0][2] * c[2] + m[0][3] * c[1]) * i_det;
        r[1][2] = (-m[3][0] * s[5] + m[3][2] * s[2] - m[3][3] * s[1]) * i_det;
        r[1][3] = (m[2][0] * s[5] - m[2][2] * s[2] + m[2][3] * s[1]) * i_det;

        r[2][0] = (m[1][0] * c[4] - m[1][1] * c[2] + m[1][3] * c[0]) * i_det;
        r[2][1] = (-m[0][0] * c[4] + m[0][1] * c[2] - m[0][3] * c[0]) * i_det;
        r[2][2] = (m[3][0] * s[4] - m[3][1] * s[2] + m[3][3] * s[0]) * i_det;
        r[2][3] = (-m[2][0] * s[4] + m[2][1] * s[2] - m[2][3] * s[0]) * i_det;

        r[3][0] = (-m[1][0] * c[3] + m[1][1] * c[1] - m[1][2] * c[0]) * i_det;
        r[3][1] = (m[0][0] * c[3] - m[0][1] * c[1] + m[0][2] * c[0]) * i_det;
        r[3][2] = (-m[3][0] * s[3] + m[3][1] * s[1] - m[3][2] * s[0]) * i_det;
        r[3][3] = (m[2][0] * s[3] - m[2][1] * s[1] + m[2][2] * s[0]) * i_det;

        Some(Self { m: r })
    }

    /// Row-major single precision copy, ready for a uniform upload.
    pub fn to_f32_array(&self) -> [f32; 16] {
        let mut out = [0.0f32; 16];
        for (i, value) in self.m.iter().flatten().enumerate() {
            out[i] = *value as f32;
        }
        out
    }

    pub fn approx_eq(&self, other: &Mat4, eps: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| super::approx_eq(*a, *b, eps))
    }
}

impl Index<usize> for Mat4 {
    type Output = [f64; 4];

    fn index(&self, row: usize) -> &[f64; 4] {
        &self.m[row]
    }
}
