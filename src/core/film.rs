use super::error::ConfigError;
use super::filter::Filter;
use super::geometry::{Bounds2i, Point2i};
use super::imageio;
use super::parallel::AtomicFloat;
use super::pbrt::{Float, Spectrum};
use super::stats_accumulator::StatsAccumulator;
use super::time_bin::TimeBinMapper;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A box filter never spreads past its own bin; anything wider goes
/// through the general reconstruction path.
const SINGLE_BIN_RADIUS: Float = 0.5 + 1e-4;

/// A film resolved in pixel and time-bin dimensions. Workers render into
/// [TransientTile]s and merge them here; merging is the only mutation and
/// per-cell accumulation is a plain order-independent sum, so any
/// interleaving of merges produces the same buffer.
pub struct TransientFilm {
    pub full_resolution: Point2i,
    mapper: TimeBinMapper,
    filter: Arc<dyn Filter>,
    storage: Mutex<FilmStorage>,
    deposited_energy: AtomicFloat,
    dropped_out_of_window: AtomicU64,
    discarded_degenerate: AtomicU64,
}

struct FilmStorage {
    /// RGB energy per (pixel, bin), bins contiguous per pixel.
    cells: Vec<[Float; 3]>,
    /// Per-pixel camera sample counts. Every camera sample statistically
    /// contributes to its pixel's whole time row, so normalization weights
    /// are two-dimensional.
    weights: Vec<Float>,
}

impl TransientFilm {
    pub fn new(
        resolution: Point2i,
        mapper: TimeBinMapper,
        filter: Arc<dyn Filter>,
    ) -> Result<TransientFilm, ConfigError> {
        if resolution.x < 1 || resolution.y < 1 {
            return Err(ConfigError::EmptyFilm {
                width: resolution.x,
                height: resolution.y,
            });
        }
        let n_pixels = resolution.x as usize * resolution.y as usize;
        info!(
            "Created transient film {}x{} with {} temporal bins of width {}",
            resolution.x,
            resolution.y,
            mapper.n_bins(),
            mapper.bin_width_opl()
        );
        Ok(TransientFilm {
            full_resolution: resolution,
            mapper,
            filter,
            storage: Mutex::new(FilmStorage {
                cells: vec![[0.0; 3]; n_pixels * mapper.n_bins()],
                weights: vec![0.0; n_pixels],
            }),
            deposited_energy: AtomicFloat::default(),
            dropped_out_of_window: AtomicU64::new(0),
            discarded_degenerate: AtomicU64::new(0),
        })
    }

    pub fn mapper(&self) -> &TimeBinMapper {
        &self.mapper
    }

    pub fn n_bins(&self) -> usize {
        self.mapper.n_bins()
    }

    pub fn pixel_bounds(&self) -> Bounds2i {
        Bounds2i::new(Point2i::new(0, 0), self.full_resolution)
    }

    pub fn get_film_tile(&self, sample_bounds: &Bounds2i) -> TransientTile {
        let bounds = sample_bounds.intersect(&self.pixel_bounds());
        TransientTile::new(bounds, self.mapper, self.filter.clone())
    }

    /// Merge a finished tile. Tiles cover disjoint pixel ranges, so merge
    /// order cannot change the result.
    pub fn merge_film_tile(&self, tile: &TransientTile) {
        vlog!(1, "Merging film tile {}", tile.pixel_bounds);
        let n_bins = self.mapper.n_bins();
        let mut storage = self.storage.lock();
        for p in &tile.pixel_bounds {
            let src_pixel = tile.pixel_index(&p);
            let dst_pixel = self.pixel_index(&p);
            storage.weights[dst_pixel] += tile.weights[src_pixel];
            for b in 0..n_bins {
                let src = tile.cells[src_pixel * n_bins + b];
                let dst = &mut storage.cells[dst_pixel * n_bins + b];
                dst[0] += src[0];
                dst[1] += src[1];
                dst[2] += src[2];
            }
        }
        self.deposited_energy.add(tile.deposited);
        self.dropped_out_of_window
            .fetch_add(tile.dropped, Ordering::Relaxed);
        self.discarded_degenerate
            .fetch_add(tile.degenerate, Ordering::Relaxed);
        StatsAccumulator::instance()
            .report_counter("Film/Out-of-window samples", tile.dropped as i64);
    }

    /// Running total of deposited energy, maintained independently of the
    /// cell buffer as a cheap conservation cross-check.
    pub fn deposited_energy(&self) -> Float {
        self.deposited_energy.load()
    }

    /// Samples whose path length fell outside the temporal window.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_out_of_window.load(Ordering::Relaxed)
    }

    /// Samples discarded for numerical degeneracy (NaN energy or length).
    pub fn degenerate_samples(&self) -> u64 {
        self.discarded_degenerate.load(Ordering::Relaxed)
    }

    /// Raw accumulated energy of one cell, for inspection and tests.
    pub fn accumulated(&self, p: &Point2i, bin: usize) -> Spectrum {
        let storage = self.storage.lock();
        Spectrum::from_rgb(storage.cells[self.pixel_index(p) * self.mapper.n_bins() + bin])
    }

    /// Total energy accumulated across every cell.
    pub fn total_energy(&self) -> Float {
        let storage = self.storage.lock();
        storage
            .cells
            .iter()
            .map(|c| (c[0] + c[1] + c[2]) as f64)
            .sum::<f64>() as Float
    }

    /// Mean radiance per (pixel, bin): each cell divided by its pixel's
    /// accumulated sample count. Layout is x-major rows, bins innermost,
    /// three channels per cell.
    pub fn develop(&self) -> Vec<Float> {
        let storage = self.storage.lock();
        let n_bins = self.mapper.n_bins();
        let mut out = vec![0.0 as Float; storage.cells.len() * 3];
        for (pixel, weight) in storage.weights.iter().enumerate() {
            if *weight == 0.0 {
                continue;
            }
            let inv = 1.0 as Float / *weight;
            for b in 0..n_bins {
                let cell = &storage.cells[pixel * n_bins + b];
                let o = (pixel * n_bins + b) * 3;
                out[o] = cell[0] * inv;
                out[o + 1] = cell[1] * inv;
                out[o + 2] = cell[2] * inv;
            }
        }
        out
    }

    /// Time-integrated image: the transient rows summed over all bins.
    pub fn develop_steady(&self) -> Vec<Float> {
        let storage = self.storage.lock();
        let n_bins = self.mapper.n_bins();
        let n_pixels = storage.weights.len();
        let mut out = vec![0.0 as Float; n_pixels * 3];
        for pixel in 0..n_pixels {
            let weight = storage.weights[pixel];
            if weight == 0.0 {
                continue;
            }
            let inv = 1.0 as Float / weight;
            for b in 0..n_bins {
                let cell = &storage.cells[pixel * n_bins + b];
                out[pixel * 3] += cell[0] * inv;
                out[pixel * 3 + 1] += cell[1] * inv;
                out[pixel * 3 + 2] += cell[2] * inv;
            }
        }
        out
    }

    /// Write the developed transient volume as a little-endian f32 stream.
    pub fn write_raw(&self, name: &str) -> io::Result<()> {
        info!("Writing transient volume {}", name);
        imageio::write_raw_volume(name, &self.develop(), self.full_resolution, self.n_bins())
    }

    /// Write the time-integrated image as an 8-bit PNG.
    pub fn write_steady_png(&self, name: &str) -> io::Result<()> {
        info!("Writing steady image {}", name);
        imageio::write_steady_png(name, &self.develop_steady(), self.full_resolution)
    }

    fn pixel_index(&self, p: &Point2i) -> usize {
        debug_assert!(self.pixel_bounds().inside_exclusive(p));
        (p.y as usize) * self.full_resolution.x as usize + p.x as usize
    }
}

/// Per-worker accumulation buffer covering one render block's pixels.
pub struct TransientTile {
    pixel_bounds: Bounds2i,
    mapper: TimeBinMapper,
    filter: Arc<dyn Filter>,
    cells: Vec<[Float; 3]>,
    weights: Vec<Float>,
    deposited: Float,
    dropped: u64,
    degenerate: u64,
}

impl TransientTile {
    pub fn new(pixel_bounds: Bounds2i, mapper: TimeBinMapper, filter: Arc<dyn Filter>) -> TransientTile {
        let n_pixels = pixel_bounds.area().max(0) as usize;
        TransientTile {
            pixel_bounds,
            mapper,
            filter,
            cells: vec![[0.0; 3]; n_pixels * mapper.n_bins()],
            weights: vec![0.0; n_pixels],
            deposited: 0.0,
            dropped: 0,
            degenerate: 0,
        }
    }

    pub fn get_pixel_bounds(&self) -> Bounds2i {
        self.pixel_bounds
    }

    /// First path length past the recordable window; paths beyond it can
    /// be terminated early.
    pub fn end_opl(&self) -> Float {
        self.mapper.end_opl()
    }

    /// Record one camera sample for a pixel's normalization weight.
    pub fn add_sample_count(&mut self, p: &Point2i) {
        if !self.pixel_bounds.inside_exclusive(p) {
            return;
        }
        let idx = self.pixel_index(p);
        self.weights[idx] += 1.0;
    }

    /// Deposit one (spectrum, path length) contribution through the
    /// temporal reconstruction filter.
    pub fn add_transient_sample(&mut self, p: &Point2i, l: Spectrum, opl: Float) {
        if !self.pixel_bounds.inside_exclusive(p) {
            return;
        }
        if l.has_nans() || !l.y().is_finite() || l.y() < 0.0 {
            error!(
                "Ignoring transient sample with invalid radiance {} at {}",
                l, p
            );
            self.degenerate += 1;
            return;
        }
        if !opl.is_finite() {
            vlog!(2, "Discarding sample with non-finite path length at {}", p);
            self.degenerate += 1;
            return;
        }

        let pixel = self.pixel_index(p);
        let n_bins = self.mapper.n_bins();

        if self.filter.radius() <= SINGLE_BIN_RADIUS {
            // Box reconstruction: one bin, deterministic floor rounding.
            match self.mapper.bin(opl) {
                Some(b) => self.deposit(pixel * n_bins + b, &l),
                None => self.dropped += 1,
            }
            return;
        }

        // Wide reconstruction: weight the bins the filter support touches
        // and renormalize so the sample's total energy is preserved.
        let c = self.mapper.continuous(opl);
        let radius = self.filter.radius();
        let b0 = (c - radius - 0.5).ceil() as i64;
        let b1 = (c + radius - 0.5).floor() as i64;
        let mut weights: SmallVec<[Float; 64]> = SmallVec::new();
        let mut sum: Float = 0.0;
        for b in b0..=b1 {
            let w = self.filter.evaluate(b as Float + 0.5 - c);
            sum += w;
            weights.push(w);
        }
        if !(sum > 0.0) {
            match self.mapper.bin(opl) {
                Some(b) => self.deposit(pixel * n_bins + b, &l),
                None => self.dropped += 1,
            }
            return;
        }
        let inv_sum = 1.0 as Float / sum;
        let mut deposited = false;
        for (i, w) in weights.iter().enumerate() {
            let b = b0 + i as i64;
            if b < 0 || b >= n_bins as i64 || *w <= 0.0 {
                continue;
            }
            self.deposit(pixel * n_bins + b as usize, &(l * (*w * inv_sum)));
            deposited = true;
        }
        if !deposited {
            self.dropped += 1;
        }
    }

    fn deposit(&mut self, idx: usize, l: &Spectrum) {
        let rgb = l.to_rgb();
        let cell = &mut self.cells[idx];
        cell[0] += rgb[0];
        cell[1] += rgb[1];
        cell[2] += rgb[2];
        self.deposited += rgb[0] + rgb[1] + rgb[2];
    }

    fn pixel_index(&self, p: &Point2i) -> usize {
        debug_assert!(self.pixel_bounds.inside_exclusive(p));
        let width = self.pixel_bounds.width() as usize;
        (p.y - self.pixel_bounds.min.y) as usize * width + (p.x - self.pixel_bounds.min.x) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BoxFilter, GaussianFilter};

    fn film(bins: i64) -> TransientFilm {
        TransientFilm::new(
            Point2i::new(4, 4),
            TimeBinMapper::new(0.0, 1.0, bins).unwrap(),
            Arc::new(BoxFilter::new()),
        )
        .unwrap()
    }

    #[test]
    fn empty_film_is_rejected() {
        let r = TransientFilm::new(
            Point2i::new(0, 4),
            TimeBinMapper::new(0.0, 1.0, 8).unwrap(),
            Arc::new(BoxFilter::new()),
        );
        assert!(r.is_err());
    }

    #[test]
    fn box_deposit_lands_in_floor_bin() {
        let film = film(8);
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let p = Point2i::new(1, 2);
        tile.add_sample_count(&p);
        tile.add_transient_sample(&p, Spectrum::new(1.0), 2.999);
        tile.add_transient_sample(&p, Spectrum::new(1.0), 3.0);
        film.merge_film_tile(&tile);
        assert_eq!(film.accumulated(&p, 2), Spectrum::new(1.0));
        assert_eq!(film.accumulated(&p, 3), Spectrum::new(1.0));
        assert_eq!(film.dropped_samples(), 0);
    }

    #[test]
    fn out_of_window_samples_are_counted_not_fatal() {
        let film = film(4);
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let p = Point2i::new(0, 0);
        tile.add_transient_sample(&p, Spectrum::new(1.0), 17.0);
        tile.add_transient_sample(&p, Spectrum::new(1.0), -0.5);
        film.merge_film_tile(&tile);
        assert_eq!(film.dropped_samples(), 2);
        assert_eq!(film.total_energy(), 0.0);
    }

    #[test]
    fn degenerate_samples_are_discarded_locally() {
        let film = film(4);
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let p = Point2i::new(0, 0);
        tile.add_transient_sample(&p, Spectrum::new(1.0), Float::NAN);
        tile.add_transient_sample(&p, Spectrum::new(Float::NAN), 1.0);
        film.merge_film_tile(&tile);
        assert_eq!(film.degenerate_samples(), 2);
        assert_eq!(film.total_energy(), 0.0);
    }

    #[test]
    fn energy_is_conserved_through_accumulation() {
        let film = film(16);
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let mut expected = 0.0;
        for i in 0..10 {
            let p = Point2i::new(i % 4, i / 4);
            let l = Spectrum::new(0.25 * (i + 1) as Float);
            tile.add_transient_sample(&p, l, i as Float + 0.5);
            expected += 3.0 * 0.25 * (i + 1) as Float;
        }
        film.merge_film_tile(&tile);
        assert!((film.total_energy() - expected).abs() < 1e-3);
        assert!((film.deposited_energy() - expected).abs() < 1e-3);
    }

    #[test]
    fn gaussian_reconstruction_preserves_energy() {
        let film = TransientFilm::new(
            Point2i::new(2, 2),
            TimeBinMapper::new(0.0, 1.0, 64).unwrap(),
            Arc::new(GaussianFilter::new(1.0)),
        )
        .unwrap();
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let p = Point2i::new(0, 0);
        tile.add_transient_sample(&p, Spectrum::new(1.0), 32.3);
        film.merge_film_tile(&tile);
        // Support is well inside the window, so the renormalized weights
        // deposit exactly the sample's energy, spread over several bins.
        assert!((film.total_energy() - 3.0).abs() < 1e-3);
        assert!(film.accumulated(&p, 32).y() > 0.0);
        assert!(film.accumulated(&p, 33).y() > 0.0);
        assert!(film.accumulated(&p, 31).y() > 0.0);
    }

    #[test]
    fn develop_normalizes_by_sample_count() {
        let film = film(4);
        let mut tile = film.get_film_tile(&film.pixel_bounds());
        let p = Point2i::new(2, 1);
        for _ in 0..4 {
            tile.add_sample_count(&p);
        }
        tile.add_transient_sample(&p, Spectrum::new(2.0), 1.5);
        film.merge_film_tile(&tile);
        let out = film.develop();
        let pixel = (p.y * 4 + p.x) as usize;
        let o = (pixel * 4 + 1) * 3;
        assert!((out[o] - 0.5).abs() < 1e-6);

        let steady = film.develop_steady();
        assert!((steady[pixel * 3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn disjoint_tiles_merge_independently() {
        let film = film(4);
        let left = Bounds2i::new(Point2i::new(0, 0), Point2i::new(2, 4));
        let right = Bounds2i::new(Point2i::new(2, 0), Point2i::new(4, 4));
        let mut t0 = film.get_film_tile(&left);
        let mut t1 = film.get_film_tile(&right);
        t0.add_transient_sample(&Point2i::new(1, 1), Spectrum::new(1.0), 0.5);
        t1.add_transient_sample(&Point2i::new(3, 1), Spectrum::new(2.0), 0.5);
        film.merge_film_tile(&t1);
        film.merge_film_tile(&t0);
        assert_eq!(film.accumulated(&Point2i::new(1, 1), 0), Spectrum::new(1.0));
        assert_eq!(film.accumulated(&Point2i::new(3, 1), 0), Spectrum::new(2.0));
    }
}
