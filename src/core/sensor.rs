use super::geometry::{Point2f, Point2i, Point3f, Ray};
use super::pbrt::Float;

/// A primary ray together with the capture bookkeeping the transient
/// integrator needs: the path length already accounted for (negative when
/// the fixed sensor and laser segments are excluded from the recording),
/// and the wall point the laser illuminates for this sample.
#[derive(Debug, Copy, Clone)]
pub struct CaptureRay {
    pub ray: Ray,
    pub opl_offset: Float,
    pub laser_spot: Point3f,
}

pub trait Sensor: Send + Sync {
    fn resolution(&self) -> Point2i;

    /// Generate the primary ray for a pixel; `u` jitters the sample point
    /// within the pixel's footprint on the relay wall.
    fn generate_ray(&self, pixel: &Point2i, u: &Point2f) -> CaptureRay;
}
