use crate::core::filter::Filter;
use crate::core::pbrt::Float;

/// This [Filter](crate::core::filter::Filter) applies a Gaussian bump
/// centered at the sample position, spreading its energy over neighboring
/// temporal bins. The support is truncated at four standard deviations and
/// the tail value is subtracted so the kernel falls to zero at the edge.
pub struct GaussianFilter {
    pub radius: Float,
    pub inv_radius: Float,

    alpha: Float,
    exp_r: Float,
}

impl GaussianFilter {
    pub fn new(stddev: Float) -> GaussianFilter {
        let radius = 4.0 * stddev;
        let alpha = 1.0 / (2.0 * stddev * stddev);
        GaussianFilter {
            radius,
            inv_radius: 1.0 / radius,
            alpha,
            exp_r: (-alpha * radius * radius).exp(),
        }
    }
}

impl Filter for GaussianFilter {
    fn radius(&self) -> Float {
        self.radius
    }

    fn inv_radius(&self) -> Float {
        self.inv_radius
    }

    fn evaluate(&self, x: Float) -> Float {
        ((-self.alpha * x * x).exp() - self.exp_r).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_is_at_center() {
        let f = GaussianFilter::new(1.0);
        assert!(f.evaluate(0.0) > f.evaluate(1.0));
        assert!(f.evaluate(1.0) > f.evaluate(3.0));
    }

    #[test]
    fn support_ends_at_radius() {
        let f = GaussianFilter::new(0.5);
        assert_eq!(f.radius(), 2.0);
        assert_eq!(f.evaluate(f.radius()), 0.0);
        assert_eq!(f.evaluate(f.radius() + 1.0), 0.0);
    }

    #[test]
    fn symmetric() {
        let f = GaussianFilter::new(2.0);
        assert_eq!(f.evaluate(1.25), f.evaluate(-1.25));
    }
}
