use super::error::ConfigError;
use super::pbrt::Float;

/// Maps a path's total optical length onto the discrete time axis of the
/// transient film. All quantities are optical path lengths, not times;
/// dividing by the speed of light is left to consumers of the developed
/// film.
#[derive(Debug, Copy, Clone)]
pub struct TimeBinMapper {
    start_opl: Float,
    bin_width_opl: Float,
    n_bins: usize,
}

impl TimeBinMapper {
    pub fn new(start_opl: Float, bin_width_opl: Float, n_bins: i64) -> Result<TimeBinMapper, ConfigError> {
        if n_bins < 1 {
            return Err(ConfigError::InvalidBinCount(n_bins));
        }
        if !(bin_width_opl > 0.0) || !bin_width_opl.is_finite() {
            return Err(ConfigError::InvalidBinWidth(bin_width_opl));
        }
        Ok(TimeBinMapper {
            start_opl,
            bin_width_opl,
            n_bins: n_bins as usize,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn start_opl(&self) -> Float {
        self.start_opl
    }

    pub fn bin_width_opl(&self) -> Float {
        self.bin_width_opl
    }

    /// First path length past the end of the recordable window.
    pub fn end_opl(&self) -> Float {
        self.start_opl + self.n_bins as Float * self.bin_width_opl
    }

    /// Discrete bin for a path length, or None when it falls outside the
    /// window (or is not a finite number).
    pub fn bin(&self, opl: Float) -> Option<usize> {
        if !opl.is_finite() {
            return None;
        }
        let b = ((opl - self.start_opl) / self.bin_width_opl).floor();
        if b < 0.0 || b >= self.n_bins as Float {
            None
        } else {
            Some(b as usize)
        }
    }

    /// Continuous bin coordinate used by wide reconstruction filters.
    pub fn continuous(&self, opl: Float) -> Float {
        (opl - self.start_opl) / self.bin_width_opl
    }
}
