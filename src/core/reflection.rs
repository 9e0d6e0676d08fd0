use super::geometry::{coordinate_system, dot_vec_normal, Normal3f, Point2f, Vector3f};
use super::pbrt::{consts::INV_PI, Float, Spectrum};
use super::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere};
use std::fmt;

/// A sampled scattering direction with its BSDF value and density.
#[derive(Debug, Copy, Clone)]
pub struct BxdfSample {
    pub f: Spectrum,
    pub wi: Vector3f,
    pub pdf: Float,
}

/// Surface scattering in world space. Directions point away from the
/// surface; `n` is the geometric normal of the interaction.
pub trait Bxdf: Send + Sync + fmt::Display {
    fn f(&self, wo: &Vector3f, n: &Normal3f, wi: &Vector3f) -> Spectrum;

    fn sample_f(&self, wo: &Vector3f, n: &Normal3f, u: &Point2f) -> Option<BxdfSample>;

    fn pdf(&self, wo: &Vector3f, n: &Normal3f, wi: &Vector3f) -> Float;

    /// Hemispherical reflectance, used for roulette weighting.
    fn rho(&self) -> Spectrum;
}

/// Ideal diffuse reflection.
#[derive(Debug, Copy, Clone)]
pub struct LambertianReflection {
    r: Spectrum,
}

impl LambertianReflection {
    pub fn new(r: Spectrum) -> LambertianReflection {
        LambertianReflection { r }
    }
}

impl Bxdf for LambertianReflection {
    fn f(&self, wo: &Vector3f, n: &Normal3f, wi: &Vector3f) -> Spectrum {
        // Reflection only: both directions must lie in the normal's
        // hemisphere.
        if dot_vec_normal(wo, n) * dot_vec_normal(wi, n) <= 0.0 {
            return Spectrum::new(0.0);
        }
        self.r * INV_PI
    }

    fn sample_f(&self, wo: &Vector3f, n: &Normal3f, u: &Point2f) -> Option<BxdfSample> {
        let nf = n.face_forward(wo);
        let local = cosine_sample_hemisphere(u);
        let nv: Vector3f = nf.into();
        let (s, t) = coordinate_system(&nv);
        let wi = s * local.x + t * local.y + nv * local.z;
        let pdf = cosine_hemisphere_pdf(local.z);
        if pdf <= 0.0 {
            return None;
        }
        Some(BxdfSample {
            f: self.r * INV_PI,
            wi,
            pdf,
        })
    }

    fn pdf(&self, wo: &Vector3f, n: &Normal3f, wi: &Vector3f) -> Float {
        if dot_vec_normal(wo, n) * dot_vec_normal(wi, n) <= 0.0 {
            return 0.0;
        }
        cosine_hemisphere_pdf(dot_vec_normal(wi, n).abs())
    }

    fn rho(&self) -> Spectrum {
        self.r
    }
}

impl fmt::Display for LambertianReflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ LambertianReflection r: {} ]", self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::Rng;

    #[test]
    fn f_is_zero_across_hemispheres() {
        let bxdf = LambertianReflection::new(Spectrum::new(0.7));
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        assert!(bxdf.f(&wo, &n, &Vector3f::new(0.0, 0.0, -1.0)).is_black());
        assert!(!bxdf.f(&wo, &n, &Vector3f::new(0.1, 0.0, 1.0).normalize()).is_black());
    }

    #[test]
    fn sample_f_matches_pdf() {
        let bxdf = LambertianReflection::new(Spectrum::new(0.5));
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.2, 0.1, 0.9).normalize();
        let mut rng = Rng::new(5);
        for _ in 0..100 {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let s = bxdf.sample_f(&wo, &n, &u).unwrap();
            assert!(dot_vec_normal(&s.wi, &n) >= 0.0);
            let pdf = bxdf.pdf(&wo, &n, &s.wi);
            assert!((pdf - s.pdf).abs() < 1e-4);
        }
    }

    #[test]
    fn sampling_flips_with_the_normal() {
        // wo below the surface samples the lower hemisphere.
        let bxdf = LambertianReflection::new(Spectrum::new(0.5));
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.0, 0.0, -1.0);
        let s = bxdf.sample_f(&wo, &n, &Point2f::new(0.4, 0.6)).unwrap();
        assert!(dot_vec_normal(&s.wi, &n) <= 0.0);
    }
}
