use super::geometry::{Point2f, Point2i};
use super::pbrt::Float;
use super::rng::Rng;

/// Per-pixel pseudo-random sample source. The stream restarts
/// deterministically at `start_pixel`, so the sequence a pixel sees is a
/// pure function of (seed, pixel) regardless of how pixels are scheduled
/// across worker threads.
pub trait Sampler: Send + Sync {
    fn samples_per_pixel(&self) -> u32;

    fn start_pixel(&mut self, p: &Point2i);

    /// Advance to the next sample of the current pixel; returns false once
    /// all samples are consumed.
    fn start_next_sample(&mut self) -> bool;

    fn current_sample_number(&self) -> u32;

    fn get_1d(&mut self) -> Float;

    fn get_2d(&mut self) -> Point2f;

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler>;
}

pub struct RandomSampler {
    samples_per_pixel: u32,
    seed: u64,
    rng: Rng,
    current_sample: u32,
}

impl RandomSampler {
    pub fn new(samples_per_pixel: u32, seed: u64) -> RandomSampler {
        RandomSampler {
            samples_per_pixel: samples_per_pixel.max(1),
            seed,
            rng: Rng::new(seed),
            current_sample: 0,
        }
    }
}

impl Sampler for RandomSampler {
    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    fn start_pixel(&mut self, p: &Point2i) {
        let mix = self
            .seed
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add((p.x as u32 as u64) << 32 | p.y as u32 as u64);
        self.rng.set_sequence(mix);
        self.current_sample = 0;
    }

    fn start_next_sample(&mut self) -> bool {
        self.current_sample += 1;
        self.current_sample < self.samples_per_pixel
    }

    fn current_sample_number(&self) -> u32 {
        self.current_sample
    }

    fn get_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }

    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.uniform_float(), self.rng.uniform_float())
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(RandomSampler::new(self.samples_per_pixel, seed))
    }
}
