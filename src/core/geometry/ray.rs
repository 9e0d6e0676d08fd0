use super::super::pbrt::Float;
use super::{Point3f, Vector3f};
use std::fmt;

/// A ray with a parametric extent. Scatter rays keep `d` normalized so a
/// hit's `t` is directly a travelled distance.
#[derive(Debug, Copy, Clone)]
#[repr(C)]
pub struct Ray {
    pub o: Point3f,
    pub d: Vector3f,
    pub t_max: Float,
}

impl Ray {
    pub fn new(o: Point3f, d: Vector3f) -> Ray {
        Ray {
            o,
            d,
            t_max: Float::INFINITY,
        }
    }

    pub fn new_segment(o: Point3f, d: Vector3f, t_max: Float) -> Ray {
        Ray { o, d, t_max }
    }

    /// Return the point at parameter `t` along the ray.
    pub fn point_at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    fn default() -> Ray {
        Ray {
            o: Point3f::zero(),
            d: Vector3f::zero(),
            t_max: Float::INFINITY,
        }
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[o={}, d={}, t_max={}]", self.o, self.d, self.t_max)
    }
}
