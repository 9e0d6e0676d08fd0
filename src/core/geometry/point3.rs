use super::super::pbrt::Float;
use super::Vector3f;
use std::fmt;
use std::ops::{Add, Sub};

/// Representation of a 3D point.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Point3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Point3f {
    #[inline]
    pub fn new(x: Float, y: Float, z: Float) -> Point3f {
        Point3f { x, y, z }
    }

    #[inline]
    pub fn zero() -> Point3f {
        Point3f::default()
    }

    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Distance between two points.
    #[inline]
    pub fn distance(&self, o: &Point3f) -> Float {
        (*self - *o).length()
    }

    /// Squared distance between two points.
    #[inline]
    pub fn distance_squared(&self, o: &Point3f) -> Float {
        (*self - *o).length_squared()
    }
}

impl Add<Vector3f> for Point3f {
    type Output = Point3f;
    fn add(self, v: Vector3f) -> Point3f {
        Point3f::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Point3f {
    type Output = Vector3f;
    fn sub(self, o: Point3f) -> Vector3f {
        Vector3f::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Sub<Vector3f> for Point3f {
    type Output = Point3f;
    fn sub(self, v: Vector3f) -> Point3f {
        Point3f::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl fmt::Display for Point3f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
