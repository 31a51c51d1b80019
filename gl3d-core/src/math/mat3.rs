use std::ops::Index;

use super::{Mat4, Vec3};

/// A row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat3 {
    m: [[f64; 3]; 3],
}

impl Mat3 {
    /// Matrix with every element set to `value`.
    pub const fn filled(value: f64) -> Self {
        Self { m: [[value; 3]; 3] }
    }

    pub const fn from_rows_array(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    /// Builds a matrix from its three row vectors.
    pub fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self::from_rows_array([r0.to_array(), r1.to_array(), r2.to_array()])
    }

    /// Builds a matrix from 9 elements in row-major order.
    pub fn from_slice(values: &[f64; 9]) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(&values[i * 3..i * 3 + 3]);
        }
        Self { m }
    }

    pub fn as_rows(&self) -> &[[f64; 3]; 3] {
        &self.m
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.m[row][column]
    }

    pub fn row(&self, row: usize) -> Vec3 {
        Vec3::from_array(self.m[row])
    }

    pub fn column(&self, column: usize) -> Vec3 {
        Vec3::new(self.m[0][column], self.m[1][column], self.m[2][column])
    }

    pub fn with_element(&self, row: usize, column: usize, value: f64) -> Self {
        let mut m = self.m;
        m[row][column] = value;
        Self { m }
    }

    pub fn with_row(&self, index: usize, row: Vec3) -> Self {
        let mut m = self.m;
        m[index] = row.to_array();
        Self { m }
    }

    pub fn with_column(&self, index: usize, column: Vec3) -> Self {
        let mut m = self.m;
        m[0][index] = column.x;
        m[1][index] = column.y;
        m[2][index] = column.z;
        Self { m }
    }

    pub fn add(&self, other: &Mat3) -> Self {
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

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Mat3) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (0..3).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Self { m }
    }

    pub fn transpose(&self) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.m[j][i];
            }
        }
        Self { m }
    }

    pub fn det(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[2][1] * m[1][2])
            - m[0][1] * (m[1][0] * m[2][2] - m[2][0] * m[1][2])
            + m[0][2] * (m[1][0] * m[2][1] - m[2][0] * m[1][1])
    }

    /// Inverse via the adjugate. `None` when the determinant is exactly zero.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.det();
        if det == 0.0 {
            return None;
        }
        let m = &self.m;
        Some(Self::from_rows_array([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ]))
    }

    /// Row-major single precision copy, ready for a uniform upload.
    pub fn to_f32_array(&self) -> [f32; 9] {
        let mut out = [0.0f32; 9];
        for (i, value) in self.m.iter().flatten().enumerate() {
            out[i] = *value as f32;
        }
        out
    }

    pub fn approx_eq(&self, other: &Mat3, eps: f64) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| super::approx_eq(*a, *b, eps))
    }
}

/// Upper-left 3x3 block, the linear part of an affine transform.
impl From<Mat4> for Mat3 {
    fn from(m: Mat4) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = m[i][j];
            }
        }
        Self { m: out }
    }
}

impl Index<usize> for Mat3 {
    type Output = [f64; 3];

    fn index(&self, row: usize) -> &[f64; 3] {
        &self.m[row]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    fn sample() -> Mat3 {
        Mat3::from_rows_array([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 2.0]])
    }

    #[test]
    fn test_det() {
        assert!((sample().det() - 6.0).abs() < 1e-12);
        assert_eq!(Mat3::identity().det(), 1.0);
    }

    #[test]
    fn test_det_and_inverse_agree_with_nalgebra() {
        for m in [sample(), Mat3::rot_x(0.7).mul(&Mat3::scale_2d(2.0, 0.5)), Mat3::transl_2d(3.0, -1.0)] {
            let reference: Matrix3<f64> = m.into();
            assert!((m.det() - reference.determinant()).abs() < 1e-12);

            let expected = Mat3::from(reference.try_inverse().unwrap());
            assert!(m.inverse().unwrap().approx_eq(&expected, 1e-12));
        }
    }

    #[test]
    fn test_inverse_roundtrip() {
        let m = sample();
        let inv = m.inverse().unwrap();
        assert!(m.mul(&inv).approx_eq(&Mat3::identity(), 1e-12));
        assert!(inv.mul(&m).approx_eq(&Mat3::identity(), 1e-12));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = Mat3::from_rows(Vec3::X, Vec3::X, Vec3::Y);
        assert_eq!(m.det(), 0.0);
        assert!(m.inverse().is_none());

        // Third row is the mean of the first two.
        let m = Mat3::from_rows_array([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [1.0, 1.0, 1.0]]);
        assert_eq!(m.det(), 0.0);
        assert!(m.inverse().is_none());
    }

    #[test]
    fn test_builders_leave_receiver_untouched() {
        let m = Mat3::identity();
        let changed = m
            .with_element(0, 1, 5.0)
            .with_row(2, Vec3::new(7.0, 8.0, 9.0))
            .with_column(0, Vec3::splat(4.0));
        assert_eq!(m, Mat3::identity());
        assert_eq!(changed.row(0), Vec3::new(4.0, 5.0, 0.0));
        assert_eq!(changed.row(2), Vec3::new(4.0, 8.0, 9.0));
        assert_eq!(changed.column(1), Vec3::new(5.0, 1.0, 8.0));
    }

    #[test]
    fn test_from_mat4_takes_upper_left_block() {
        let m = Mat3::from(Mat4::transl(5.0, 6.0, 7.0).mul(&Mat4::scale(2.0, 3.0, 4.0)));
        assert_eq!(m.row(0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(m.row(1), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(m.row(2), Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_f32_array_is_row_major() {
        let m = sample().to_f32_array();
        assert_eq!(m[2], 1.0);
        assert_eq!(m[3], 1.0);
        assert_eq!(m[4], 3.0);
    }
}
