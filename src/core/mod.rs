#[macro_use]
pub mod vlog;
pub mod error;
pub mod pbrt;
pub mod geometry;
pub mod spectrum;
pub mod rng;
pub mod parallel;
pub mod options;
pub mod stats_accumulator;
pub mod progress_reporter;
pub mod sampling;
pub mod sampler;
pub mod filter;
pub mod interaction;
pub mod reflection;
pub mod shape;
pub mod primitive;
pub mod light;
pub mod scene;
pub mod sensor;
pub mod time_bin;
pub mod film;
pub mod imageio;
