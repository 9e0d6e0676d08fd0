use super::pbrt::Float;

/// An interface for the reconstruction filtering applied along the time
/// axis when a sample's path length is deposited into temporal bins. The
/// argument to `evaluate` is the offset from the sample position in bin
/// units.
pub trait Filter: Send + Sync {
    fn radius(&self) -> Float;
    fn inv_radius(&self) -> Float;

    fn evaluate(&self, x: Float) -> Float;
}
