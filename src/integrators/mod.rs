pub mod transient_path;

pub use transient_path::{NlosConfig, TemporalFilterSpec, TransientPathIntegrator};
