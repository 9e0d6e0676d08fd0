//! Configuration errors reported before any rendering starts.
use super::geometry::Point2i;
use super::pbrt::Float;
use thiserror::Error;

/// Setup-time failures. Rendering itself never raises these; per-sample
/// numerical problems are recovered locally by discarding the sample.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown temporal filter \"{0}\" (expected \"box\" or \"gaussian\")")]
    UnknownTemporalFilter(String),

    #[error("temporal filter stddev must be positive, got {0}")]
    InvalidFilterStddev(Float),

    #[error("temporal bin count must be at least 1, got {0}")]
    InvalidBinCount(i64),

    #[error("temporal bin width must be positive, got {0}")]
    InvalidBinWidth(Float),

    #[error("film resolution must be at least 1x1, got {width}x{height}")]
    EmptyFilm { width: i32, height: i32 },

    #[error("block size must be at least 1, got {0}")]
    InvalidBlockSize(i32),

    #[error("{name} must be -1 (disabled) or at least 1, got {value}")]
    InvalidDepth { name: &'static str, value: i32 },

    #[error("russian roulette start depth must be at least 1, got {0}")]
    InvalidRRouletteDepth(i32),

    #[error("projector field of view must lie in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(Float),

    #[error("confocal capture requires sensor and laser origins to coincide")]
    ConfocalOriginMismatch,

    #[error("scene has no relay wall surface")]
    NoRelayWall,

    #[error("sensor resolution {sensor} does not match film resolution {film}")]
    ResolutionMismatch { sensor: Point2i, film: Point2i },

    #[error("shape \"{0}\" is degenerate (zero area)")]
    DegenerateShape(&'static str),
}
