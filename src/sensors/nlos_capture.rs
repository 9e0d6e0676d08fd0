use crate::core::error::ConfigError;
use crate::core::geometry::{Point2f, Point2i, Point3f, Ray};
use crate::core::pbrt::Float;
use crate::core::sensor::{CaptureRay, Sensor};
use crate::core::shape::Rectangle;
use std::sync::Arc;

const ORIGIN_EPSILON: Float = 1e-5;

/// Where the laser points.
#[derive(Debug, Copy, Clone)]
pub enum LaserAim {
    /// Aim at the wall point under a film pixel (fractional coordinates
    /// allowed; the pixel center is used).
    Pixel(Point2f),
    /// Aim at an explicit world-space point.
    Point3d(Point3f),
}

/// A non-line-of-sight capture sensor: a point of view scanning a grid of
/// points on the relay wall. Film pixel (x, y) maps to the wall through the
/// wall rectangle's uv parameterization. In confocal mode the laser
/// illuminates the very point being scanned; otherwise it holds a fixed
/// aim for the whole capture.
pub struct NlosCaptureMeter {
    wall: Arc<Rectangle>,
    resolution: Point2i,
    sensor_origin: Point3f,
    laser_origin: Point3f,
    laser_aim: LaserAim,
    confocal: bool,
    account_first_and_last_bounces: bool,
}

impl NlosCaptureMeter {
    pub fn new(
        wall: Arc<Rectangle>,
        resolution: Point2i,
        sensor_origin: Point3f,
        laser_origin: Point3f,
        laser_aim: LaserAim,
        confocal: bool,
        account_first_and_last_bounces: bool,
    ) -> Result<NlosCaptureMeter, ConfigError> {
        if resolution.x < 1 || resolution.y < 1 {
            return Err(ConfigError::EmptyFilm {
                width: resolution.x,
                height: resolution.y,
            });
        }
        if confocal && sensor_origin.distance(&laser_origin) > ORIGIN_EPSILON {
            return Err(ConfigError::ConfocalOriginMismatch);
        }
        info!(
            "Created NLOS capture meter: {}x{} wall scan, sensor at {}, laser at {}, confocal: {}",
            resolution.x, resolution.y, sensor_origin, laser_origin, confocal
        );
        Ok(NlosCaptureMeter {
            wall,
            resolution,
            sensor_origin,
            laser_origin,
            laser_aim,
            confocal,
            account_first_and_last_bounces,
        })
    }

    pub fn sensor_origin(&self) -> Point3f {
        self.sensor_origin
    }

    pub fn laser_origin(&self) -> Point3f {
        self.laser_origin
    }

    /// The wall point a pixel scans, jittered inside the pixel footprint.
    fn wall_point(&self, pixel: &Point2i, u: &Point2f) -> Point3f {
        let uv = Point2f::new(
            (pixel.x as Float + u.x) / self.resolution.x as Float,
            (pixel.y as Float + u.y) / self.resolution.y as Float,
        );
        self.wall.point_at_uv(&uv)
    }

    fn fixed_laser_spot(&self) -> Point3f {
        match self.laser_aim {
            LaserAim::Pixel(p) => self.wall.point_at_uv(&Point2f::new(
                (p.x + 0.5) / self.resolution.x as Float,
                (p.y + 0.5) / self.resolution.y as Float,
            )),
            LaserAim::Point3d(p) => p,
        }
    }
}

impl Sensor for NlosCaptureMeter {
    fn resolution(&self) -> Point2i {
        self.resolution
    }

    fn generate_ray(&self, pixel: &Point2i, u: &Point2f) -> CaptureRay {
        let wall_pt = self.wall_point(pixel, u);
        let d_sensor = self.sensor_origin.distance(&wall_pt);
        let dir = (wall_pt - self.sensor_origin).normalize();

        let laser_spot = if self.confocal {
            wall_pt
        } else {
            self.fixed_laser_spot()
        };
        let d_laser = self.laser_origin.distance(&laser_spot);

        // With the fixed segments excluded, recorded path lengths cover
        // only the variable part between the two wall interactions.
        let opl_offset = if self.account_first_and_last_bounces {
            0.0
        } else {
            -(d_sensor + d_laser)
        };

        CaptureRay {
            ray: Ray::new(self.sensor_origin, dir),
            opl_offset,
            laser_spot,
        }
    }
}
