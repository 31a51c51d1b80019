//! Immutable linear algebra for the rendering pipeline.
//!
//! All types are plain `Copy` values in double precision. Matrices are stored
//! row-major and compose with the row vector on the left, so a point is
//! transformed as `p * model * view * projection`.

pub mod mat3;
pub mod mat4;
pub mod point;
pub mod vec2;
pub mod vec3;

pub use mat3::Mat3;
pub use mat4::Mat4;
pub use point::Point3H;
pub use vec2::Vec2;
pub use vec3::Vec3;

/// Tolerance used by approximate comparisons.
pub const EPSILON: f64 = 1e-9;

/// Returns true when `a` and `b` differ by no more than `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
