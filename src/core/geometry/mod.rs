pub mod bounds2;
pub mod normal3;
pub mod point2;
pub mod point3;
pub mod ray;
pub mod vector3;

pub use bounds2::{Bounds2i, Bounds2Iterator};
pub use normal3::Normal3f;
pub use point2::{Point2f, Point2i};
pub use point3::Point3f;
pub use ray::Ray;
pub use vector3::Vector3f;

use super::pbrt::Float;

/// Dot product between a vector and a normal.
#[inline]
pub fn dot_vec_normal(v: &Vector3f, n: &Normal3f) -> Float {
    v.x * n.x + v.y * n.y + v.z * n.z
}

/// Construct an orthonormal basis around `v1`, which must be normalized.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}
