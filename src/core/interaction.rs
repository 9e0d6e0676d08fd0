use super::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use super::pbrt::{consts::SHADOW_EPSILON, Float};
use super::primitive::Primitive;
use std::sync::Arc;

/// A point on a surface hit by a ray, together with the primitive it
/// belongs to.
#[derive(Clone)]
pub struct SurfaceInteraction {
    pub p: Point3f,
    pub n: Normal3f,
    /// Direction back toward the ray origin.
    pub wo: Vector3f,
    pub uv: Point2f,
    /// Ray parameter of the hit; equals travelled distance for normalized
    /// ray directions.
    pub t: Float,
    pub primitive: Arc<Primitive>,
}

impl SurfaceInteraction {
    /// Spawn a ray from this interaction going in direction `d`, nudged off
    /// the surface to avoid self-intersection.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        Ray::new(self.offset_origin(d), *d)
    }

    /// Spawn a shadow ray from this interaction towards `target`. The
    /// direction is left unnormalized so `t_max` just short of one excludes
    /// the endpoint's own surface.
    pub fn spawn_ray_to(&self, target: &Point3f) -> Ray {
        let o = self.offset_origin(&(*target - self.p));
        Ray::new_segment(o, *target - o, 1.0 - SHADOW_EPSILON)
    }

    fn offset_origin(&self, d: &Vector3f) -> Point3f {
        let n: Vector3f = self.n.into();
        if self.n.dot_vec(d) >= 0.0 {
            self.p + n * SHADOW_EPSILON
        } else {
            self.p - n * SHADOW_EPSILON
        }
    }
}
