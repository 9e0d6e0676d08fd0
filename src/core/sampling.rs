//! 1D sampling structures and sampling functions over common domains.
use super::geometry::{Point2f, Vector3f};
use super::pbrt::{
    consts::{FRAC_PI_2, FRAC_PI_4, INV_PI, PI},
    find_interval, Float,
};

#[derive(Debug, Clone)]
pub struct Distribution1D {
    /// Probability distribution function.
    pub func: Vec<Float>,
    /// Cumulative distribution function.
    pub cdf: Vec<Float>,
    /// The integral of the probability distribution function.
    pub func_int: Float,
}

impl Distribution1D {
    pub fn new(f: &[Float]) -> Distribution1D {
        let n = f.len();
        let mut cdf: Vec<Float> = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..n + 1 {
            let prev = cdf[i - 1];
            cdf.push(prev + f[i - 1] / n as Float);
        }

        // Transform step function integral into CDF
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, v) in cdf.iter_mut().enumerate().skip(1) {
                *v = i as Float / n as Float;
            }
        } else {
            for v in cdf.iter_mut().skip(1) {
                *v /= func_int;
            }
        }

        Distribution1D {
            func: f.to_vec(),
            cdf,
            func_int,
        }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Samples the CDF segment that surrounds the value u.
    pub fn sample_discrete(&self, u: Float, pdf: Option<&mut Float>) -> usize {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        if let Some(pdf) = pdf {
            *pdf = if self.func_int > 0.0 {
                self.func[offset] / (self.func_int * self.count() as Float)
            } else {
                0.0
            };
        }
        offset
    }

    /// Compute the probability of sampling a given index from the discrete PDF.
    pub fn discrete_pdf(&self, index: usize) -> Float {
        debug_assert!(index < self.func.len());
        self.func[index] / (self.func_int * self.func.len() as Float)
    }
}

/// Sample a point on the unit disk with a low-distortion concentric mapping.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to $[-1,1]^2$
    let u_offset = Point2f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0);

    // Handle degeneracy at the origin
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::default();
    }

    // Apply concentric mapping to point
    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, FRAC_PI_2 - FRAC_PI_4 * (u_offset.x / u_offset.y))
    };
    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Sample a direction on the +z hemisphere with cosine-weighted density.
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = (1.0 as Float - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vector3f::new(d.x, d.y, z)
}

#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Sample a direction on the sphere uniformly with respect to solid angle.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u.x;
    let r = (1.0 as Float - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}
