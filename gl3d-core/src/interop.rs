//! Conversions to and from `nalgebra` types.
//!
//! Element order is preserved: row `i`, column `j` maps to `(i, j)` on both
//! sides, so the row-vector convention carries over unchanged.

use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};

use crate::math::{Mat3, Mat4, Point3H, Vec2, Vec3};

impl From<Mat4> for Matrix4<f64> {
    fn from(m: Mat4) -> Self {
        Matrix4::from_fn(|r, c| m[r][c])
    }
}

impl From<Matrix4<f64>> for Mat4 {
    fn from(m: Matrix4<f64>) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = m[(r, c)];
            }
        }
        Mat4::from_rows_array(rows)
    }
}

impl From<Mat3> for Matrix3<f64> {
    fn from(m: Mat3) -> Self {
        Matrix3::from_fn(|r, c| m[r][c])
    }
}

impl From<Matrix3<f64>> for Mat3 {
    fn from(m: Matrix3<f64>) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = m[(r, c)];
            }
        }
        Mat3::from_rows_array(rows)
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for Point3<f64> {
    fn from(v: Vec3) -> Self {
        Point3::new(v.x, v.y, v.z)
    }
}

impl From<Vec2> for Vector2<f64> {
    fn from(v: Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<Point3H> for Vector4<f64> {
    fn from(p: Point3H) -> Self {
        Vector4::new(p.x, p.y, p.z, p.w)
    }
}

impl From<Vector4<f64>> for Point3H {
    fn from(v: Vector4<f64>) -> Self {
        Point3H::with_w_component(v.x, v.y, v.z, v.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_vector_product_matches_transposed_column_product() {
        let m = Mat4::rot_xyz(0.4, 0.1, -0.8).mul(&Mat4::transl(1.0, 2.0, 3.0));
        let p = Point3H::new(0.5, -1.5, 2.0);

        let ours = p.mul_mat4(&m);
        let theirs: Vector4<f64> = Matrix4::from(m).transpose() * Vector4::from(p);
        let theirs = Point3H::from(theirs);

        for (a, b) in ours.to_array().iter().zip(theirs.to_array().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mat3_roundtrip() {
        let m = Mat3::rot_y(0.3);
        assert_eq!(Mat3::from(Matrix3::from(m)), m);
    }

    #[test]
    fn test_cross_product_agrees() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let expected = Vector3::from(a).cross(&Vector3::from(b));
        assert_eq!(a.cross(b), Vec3::from(expected));
    }
}
