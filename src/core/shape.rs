use super::error::ConfigError;
use super::geometry::{Normal3f, Point2f, Point3f, Ray, Vector3f};
use super::pbrt::{consts::PI, quadratic, Float};
use super::sampling::uniform_sample_sphere;

/// Hits closer than this along a ray are treated as self-intersections.
const HIT_EPSILON: Float = 1e-5;

/// A ray/shape intersection record, before it is associated with a
/// primitive.
#[derive(Debug, Copy, Clone)]
pub struct ShapeHit {
    pub t: Float,
    pub p: Point3f,
    pub n: Normal3f,
    pub uv: Point2f,
}

/// A point sampled on a shape's surface with uniform area density.
#[derive(Debug, Copy, Clone)]
pub struct ShapeSample {
    pub p: Point3f,
    pub n: Normal3f,
}

pub trait Shape: Send + Sync {
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    fn area(&self) -> Float;

    /// Sample a point uniformly by area; the density is `1 / area()`.
    fn sample(&self, u: &Point2f) -> ShapeSample;

    /// Outward normal at a point assumed to lie on the surface.
    fn normal_at(&self, p: &Point3f) -> Normal3f;
}

/// A parallelogram spanned by two edge vectors from a corner point. The
/// relay wall and other planar patches in a capture scene are rectangles.
pub struct Rectangle {
    p0: Point3f,
    e1: Vector3f,
    e2: Vector3f,
    n: Normal3f,
    area: Float,
    // Inverse Gram matrix of (e1, e2) for the uv solve; the edges are not
    // required to be orthogonal.
    inv_g: [Float; 3],
}

impl Rectangle {
    pub fn new(p0: Point3f, e1: Vector3f, e2: Vector3f) -> Result<Rectangle, ConfigError> {
        let cross = e1.cross(&e2);
        let area = cross.length();
        if !(area > 0.0) {
            return Err(ConfigError::DegenerateShape("rectangle"));
        }
        let g11 = e1.dot(&e1);
        let g12 = e1.dot(&e2);
        let g22 = e2.dot(&e2);
        let det = g11 * g22 - g12 * g12;
        Ok(Rectangle {
            p0,
            e1,
            e2,
            n: Normal3f::from(cross.normalize()),
            area,
            inv_g: [g22 / det, -g12 / det, g11 / det],
        })
    }

    /// Map a uv coordinate in `[0,1]^2` to a point on the rectangle.
    pub fn point_at_uv(&self, uv: &Point2f) -> Point3f {
        self.p0 + self.e1 * uv.x + self.e2 * uv.y
    }

    pub fn normal(&self) -> Normal3f {
        self.n
    }

    fn uv_of(&self, p: &Point3f) -> Point2f {
        let d = *p - self.p0;
        let a = d.dot(&self.e1);
        let b = d.dot(&self.e2);
        Point2f::new(
            self.inv_g[0] * a + self.inv_g[1] * b,
            self.inv_g[1] * a + self.inv_g[2] * b,
        )
    }
}

impl Shape for Rectangle {
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let denom = self.n.dot_vec(&ray.d);
        if denom.abs() < 1e-9 {
            return None;
        }
        let t = self.n.dot_vec(&(self.p0 - ray.o)) / denom;
        if t <= HIT_EPSILON || t >= ray.t_max {
            return None;
        }
        let p = ray.point_at(t);
        let uv = self.uv_of(&p);
        if uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 {
            return None;
        }
        Some(ShapeHit {
            t,
            p,
            n: self.n,
            uv,
        })
    }

    fn area(&self) -> Float {
        self.area
    }

    fn sample(&self, u: &Point2f) -> ShapeSample {
        ShapeSample {
            p: self.point_at_uv(u),
            n: self.n,
        }
    }

    fn normal_at(&self, _p: &Point3f) -> Normal3f {
        self.n
    }
}

pub struct Sphere {
    center: Point3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Point3f, radius: Float) -> Result<Sphere, ConfigError> {
        if !(radius > 0.0) {
            return Err(ConfigError::DegenerateShape("sphere"));
        }
        Ok(Sphere { center, radius })
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let oc = ray.o - self.center;
        let a = ray.d.dot(&ray.d);
        let b = 2.0 * oc.dot(&ray.d);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let mut t0 = 0.0;
        let mut t1 = 0.0;
        if !quadratic(a, b, c, &mut t0, &mut t1) {
            return None;
        }
        let t = if t0 > HIT_EPSILON && t0 < ray.t_max {
            t0
        } else if t1 > HIT_EPSILON && t1 < ray.t_max {
            t1
        } else {
            return None;
        };
        let p = ray.point_at(t);
        let n = self.normal_at(&p);
        let local = p - self.center;
        let phi = local.y.atan2(local.x);
        let theta = num::clamp(local.z / self.radius, -1.0, 1.0).acos();
        Some(ShapeHit {
            t,
            p,
            n,
            uv: Point2f::new((phi + PI) / (2.0 * PI), theta / PI),
        })
    }

    fn area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn sample(&self, u: &Point2f) -> ShapeSample {
        let d = uniform_sample_sphere(u);
        ShapeSample {
            p: self.center + d * self.radius,
            n: Normal3f::from(d),
        }
    }

    fn normal_at(&self, p: &Point3f) -> Normal3f {
        Normal3f::from((*p - self.center) / self.radius)
    }
}
