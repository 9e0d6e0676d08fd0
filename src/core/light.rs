use super::error::ConfigError;
use super::geometry::{Point3f, Vector3f};
use super::pbrt::{consts::PI, radians, Float, Spectrum};
use std::fmt;

/// Incident illumination at a point from a delta light: the unattenuated
/// irradiance-style value, the direction toward the light, and the distance
/// to it. Surface cosines are the caller's business.
#[derive(Debug, Copy, Clone)]
pub struct LiSample {
    pub e: Spectrum,
    pub wi: Vector3f,
    pub dist: Float,
}

pub trait Light: Send + Sync + fmt::Display {
    fn origin(&self) -> Point3f;

    fn sample_li(&self, p: &Point3f) -> LiSample;

    fn power(&self) -> Spectrum;
}

/// A pulsed laser modeled as a projector: a delta position emitting a fixed
/// radiant intensity into a narrow cone around its aim direction. Points
/// outside the cone receive nothing.
pub struct ProjectorLight {
    origin: Point3f,
    dir: Vector3f,
    cos_half_fov: Float,
    intensity: Spectrum,
}

impl ProjectorLight {
    pub fn new(
        origin: Point3f,
        look_at: Point3f,
        fov_degrees: Float,
        intensity: Spectrum,
    ) -> Result<ProjectorLight, ConfigError> {
        if !(fov_degrees > 0.0) || fov_degrees >= 180.0 {
            return Err(ConfigError::InvalidFieldOfView(fov_degrees));
        }
        let aim = look_at - origin;
        if !(aim.length_squared() > 0.0) {
            return Err(ConfigError::InvalidFieldOfView(fov_degrees));
        }
        Ok(ProjectorLight {
            origin,
            dir: aim.normalize(),
            cos_half_fov: (radians(fov_degrees) * 0.5).cos(),
            intensity,
        })
    }
}

impl Light for ProjectorLight {
    fn origin(&self) -> Point3f {
        self.origin
    }

    fn sample_li(&self, p: &Point3f) -> LiSample {
        let v = *p - self.origin;
        let dist = v.length();
        if !(dist > 0.0) {
            return LiSample {
                e: Spectrum::new(0.0),
                wi: -self.dir,
                dist: 0.0,
            };
        }
        let w = v / dist;
        let e = if w.dot(&self.dir) >= self.cos_half_fov {
            self.intensity / (dist * dist)
        } else {
            Spectrum::new(0.0)
        };
        LiSample { e, wi: -w, dist }
    }

    fn power(&self) -> Spectrum {
        self.intensity * (2.0 * PI * (1.0 - self.cos_half_fov))
    }
}

impl fmt::Display for ProjectorLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ ProjectorLight origin: {} dir: {} intensity: {} ]",
            self.origin, self.dir, self.intensity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fov_is_rejected() {
        let r = ProjectorLight::new(
            Point3f::zero(),
            Point3f::new(0.0, 0.0, -1.0),
            0.0,
            Spectrum::new(1.0),
        );
        assert!(r.is_err());
    }

    #[test]
    fn points_outside_the_cone_get_nothing() {
        let light = ProjectorLight::new(
            Point3f::zero(),
            Point3f::new(0.0, 0.0, -1.0),
            10.0,
            Spectrum::new(1.0),
        )
        .unwrap();
        let inside = light.sample_li(&Point3f::new(0.0, 0.0, -2.0));
        assert!(!inside.e.is_black());
        assert!((inside.e.y() - 0.25).abs() < 1e-3);
        let outside = light.sample_li(&Point3f::new(2.0, 0.0, -2.0));
        assert!(outside.e.is_black());
    }

    #[test]
    fn falls_off_with_squared_distance() {
        let light = ProjectorLight::new(
            Point3f::zero(),
            Point3f::new(0.0, 0.0, -1.0),
            20.0,
            Spectrum::new(1.0),
        )
        .unwrap();
        let near = light.sample_li(&Point3f::new(0.0, 0.0, -1.0));
        let far = light.sample_li(&Point3f::new(0.0, 0.0, -3.0));
        assert!((near.e.y() / far.e.y() - 9.0).abs() < 1e-3);
    }
}
