use crate::core::filter::Filter;
use crate::core::pbrt::Float;

/// This [Filter](crate::core::filter::Filter) equally weights all samples
/// within half a bin of the sample position, so every deposit lands in
/// exactly one temporal bin with deterministic floor rounding.
pub struct BoxFilter {
    pub radius: Float,
    pub inv_radius: Float,
}

impl BoxFilter {
    pub fn new() -> BoxFilter {
        BoxFilter {
            radius: 0.5,
            inv_radius: 2.0,
        }
    }
}

impl Default for BoxFilter {
    fn default() -> BoxFilter {
        BoxFilter::new()
    }
}

impl Filter for BoxFilter {
    fn radius(&self) -> Float {
        self.radius
    }

    fn inv_radius(&self) -> Float {
        self.inv_radius
    }

    fn evaluate(&self, _x: Float) -> Float {
        1.0
    }
}
