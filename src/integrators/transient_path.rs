use crate::core::error::ConfigError;
use crate::core::film::{TransientFilm, TransientTile};
use crate::core::filter::Filter;
use crate::core::geometry::{dot_vec_normal, Bounds2i, Point2f, Point2i, Point3f, Vector3f};
use crate::core::interaction::SurfaceInteraction;
use crate::core::pbrt::{Float, Spectrum};
use crate::core::primitive::Primitive;
use crate::core::progress_reporter::ProgressReporter;
use crate::core::sampler::Sampler;
use crate::core::sampling::Distribution1D;
use crate::core::scene::Scene;
use crate::core::sensor::{CaptureRay, Sensor};
use crate::core::stats_accumulator::StatsAccumulator;
use crate::filters::{BoxFilter, GaussianFilter};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reconstruction applied along the time axis at deposit time.
#[derive(Debug, Copy, Clone)]
pub enum TemporalFilterSpec {
    Box,
    Gaussian { stddev: Float },
}

impl TemporalFilterSpec {
    pub fn from_name(name: &str, stddev: Float) -> Result<TemporalFilterSpec, ConfigError> {
        match name {
            "box" => Ok(TemporalFilterSpec::Box),
            "gaussian" => Ok(TemporalFilterSpec::Gaussian { stddev }),
            other => Err(ConfigError::UnknownTemporalFilter(String::from(other))),
        }
    }

    pub fn create(&self) -> Result<Arc<dyn Filter>, ConfigError> {
        match *self {
            TemporalFilterSpec::Box => Ok(Arc::new(BoxFilter::new())),
            TemporalFilterSpec::Gaussian { stddev } => {
                if !(stddev > 0.0) {
                    return Err(ConfigError::InvalidFilterStddev(stddev));
                }
                Ok(Arc::new(GaussianFilter::new(stddev)))
            }
        }
    }
}

/// Immutable integrator configuration, validated before rendering starts.
#[derive(Debug, Clone)]
pub struct NlosConfig {
    /// Edge length in pixels of the blocks handed to worker threads.
    pub block_size: i32,
    /// Longest path depth, -1 for unbounded.
    pub max_depth: i32,
    /// When not -1, only paths with exactly this many surface bounces are
    /// recorded.
    pub filter_depth: i32,
    /// Bounce count at which russian roulette may begin.
    pub rr_depth: i32,
    /// Reject paths whose only surface interaction is the relay wall.
    pub discard_direct_paths: bool,
    /// Next-event estimation targeted at the laser's illuminated wall spot.
    pub nlos_laser_sampling: bool,
    /// Bias bounce directions toward hidden geometry, combined with BSDF
    /// sampling by one-sample multiple importance sampling.
    pub nlos_hidden_geometry_sampling: bool,
    /// Throughput-weighted russian roulette termination of deep paths.
    pub nlos_hidden_geometry_sampling_do_rroulette: bool,
    /// Let the hidden-geometry strategy also target the relay wall.
    pub nlos_hidden_geometry_sampling_includes_relay_wall: bool,
    pub temporal_filter: TemporalFilterSpec,
    pub seed: u64,
}

impl Default for NlosConfig {
    fn default() -> NlosConfig {
        NlosConfig {
            block_size: 16,
            max_depth: -1,
            filter_depth: -1,
            rr_depth: 5,
            discard_direct_paths: true,
            nlos_laser_sampling: false,
            nlos_hidden_geometry_sampling: false,
            nlos_hidden_geometry_sampling_do_rroulette: false,
            nlos_hidden_geometry_sampling_includes_relay_wall: false,
            temporal_filter: TemporalFilterSpec::Box,
            seed: 0,
        }
    }
}

impl NlosConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size < 1 {
            return Err(ConfigError::InvalidBlockSize(self.block_size));
        }
        if self.max_depth != -1 && self.max_depth < 1 {
            return Err(ConfigError::InvalidDepth {
                name: "max_depth",
                value: self.max_depth,
            });
        }
        if self.filter_depth != -1 && self.filter_depth < 1 {
            return Err(ConfigError::InvalidDepth {
                name: "filter_depth",
                value: self.filter_depth,
            });
        }
        if self.rr_depth < 1 {
            return Err(ConfigError::InvalidRRouletteDepth(self.rr_depth));
        }
        self.temporal_filter.create().map(|_| ())
    }
}

/// Samples bounce directions by picking points on the target surfaces
/// uniformly by area. Shape selection is area-proportional, so the density
/// over the union is `1 / total_area` and a direction's solid-angle pdf
/// follows from the surface point the traced ray actually reaches.
struct HiddenGeometrySampler {
    prims: Vec<Arc<Primitive>>,
    distr: Distribution1D,
    total_area: Float,
}

impl HiddenGeometrySampler {
    fn new(scene: &Scene, include_relay_wall: bool) -> Option<HiddenGeometrySampler> {
        let prims: Vec<Arc<Primitive>> = scene
            .primitives
            .iter()
            .filter(|p| include_relay_wall || !p.is_relay_wall())
            .cloned()
            .collect();
        if prims.is_empty() {
            return None;
        }
        let areas: Vec<Float> = prims.iter().map(|p| p.shape.area()).collect();
        let total_area: Float = areas.iter().sum();
        if !(total_area > 0.0) {
            return None;
        }
        Some(HiddenGeometrySampler {
            distr: Distribution1D::new(&areas),
            prims,
            total_area,
        })
    }

    fn sample_dir(&self, from: &Point3f, u_select: Float, u: &Point2f) -> Option<Vector3f> {
        let idx = self.distr.sample_discrete(u_select, None);
        let s = self.prims[idx].shape.sample(u);
        let d = s.p - *from;
        if !(d.length_squared() > 0.0) {
            return None;
        }
        Some(d.normalize())
    }

    /// Solid-angle density of the direction that produced `hit`.
    fn pdf_dir(&self, from: &Point3f, hit: &SurfaceInteraction) -> Float {
        if !self.contains(&hit.primitive) {
            return 0.0;
        }
        let d = hit.p - *from;
        let r2 = d.length_squared();
        if !(r2 > 0.0) {
            return 0.0;
        }
        let cos = dot_vec_normal(&(d / r2.sqrt()), &hit.n).abs();
        if cos < 1e-6 {
            return 0.0;
        }
        r2 / (cos * self.total_area)
    }

    fn contains(&self, prim: &Arc<Primitive>) -> bool {
        self.prims.iter().any(|p| Arc::ptr_eq(p, prim))
    }
}

/// Traces time-resolved light transport for a non-line-of-sight capture:
/// primary rays scan the relay wall, paths bounce through hidden geometry,
/// and every next-event connection back to the laser deposits its radiance
/// at the path's total optical length.
pub struct TransientPathIntegrator {
    config: NlosConfig,
    sensor: Arc<dyn Sensor>,
    film: Arc<TransientFilm>,
    sampler: Arc<dyn Sampler>,
    abort: Arc<AtomicBool>,
}

impl TransientPathIntegrator {
    pub fn new(
        config: NlosConfig,
        sensor: Arc<dyn Sensor>,
        film: Arc<TransientFilm>,
        sampler: Arc<dyn Sampler>,
    ) -> Result<TransientPathIntegrator, ConfigError> {
        config.validate()?;
        if sensor.resolution() != film.full_resolution {
            return Err(ConfigError::ResolutionMismatch {
                sensor: sensor.resolution(),
                film: film.full_resolution,
            });
        }
        Ok(TransientPathIntegrator {
            config,
            sensor,
            film,
            sampler,
            abort: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn film(&self) -> &Arc<TransientFilm> {
        &self.film
    }

    /// Token that cancels the render between blocks when set. Blocks
    /// already in flight finish and merge; pending blocks are skipped.
    pub fn abort_token(&self) -> Arc<AtomicBool> {
        self.abort.clone()
    }

    pub fn render(&self, scene: &Scene) {
        let hidden = if self.config.nlos_hidden_geometry_sampling {
            let sampler = HiddenGeometrySampler::new(
                scene,
                self.config.nlos_hidden_geometry_sampling_includes_relay_wall,
            );
            if sampler.is_none() {
                warn!("Hidden geometry sampling requested but the scene has no target surfaces; falling back to BSDF sampling");
            }
            sampler
        } else {
            None
        };

        let sample_bounds = self.film.pixel_bounds();
        let block_size = self.config.block_size;
        let n_blocks = Point2i::new(
            (sample_bounds.width() + block_size - 1) / block_size,
            (sample_bounds.height() + block_size - 1) / block_size,
        );
        let reporter = ProgressReporter::new((n_blocks.x as u64) * (n_blocks.y as u64), "Rendering");
        Bounds2i::new(Point2i::default(), n_blocks)
            .into_iter()
            .par_bridge()
            .for_each(|block| {
                if self.abort.load(Ordering::Relaxed) {
                    return;
                }

                let mut tile_sampler = self.sampler.clone_with_seed(self.config.seed);

                let x0 = sample_bounds.min.x + block.x * block_size;
                let y0 = sample_bounds.min.y + block.y * block_size;
                let tile_bounds = Bounds2i::new(
                    Point2i::new(x0, y0),
                    Point2i::new(
                        (x0 + block_size).min(sample_bounds.max.x),
                        (y0 + block_size).min(sample_bounds.max.y),
                    ),
                );
                vlog!(1, "Starting block {}", tile_bounds);
                let mut tile = self.film.get_film_tile(&tile_bounds);

                for pixel in &tile_bounds {
                    tile_sampler.start_pixel(&pixel);
                    loop {
                        let u = tile_sampler.get_2d();
                        let capture = self.sensor.generate_ray(&pixel, &u);
                        StatsAccumulator::instance()
                            .report_counter("Integrator/Camera rays traced", 1);
                        tile.add_sample_count(&pixel);
                        self.li(
                            scene,
                            &capture,
                            &mut *tile_sampler,
                            &mut tile,
                            &pixel,
                            hidden.as_ref(),
                        );
                        if !tile_sampler.start_next_sample() {
                            break;
                        }
                    }
                }

                self.film.merge_film_tile(&tile);
                reporter.update(1);
            });
        reporter.done();
        info!("Rendering finished");
    }

    /// Trace one primary ray, depositing transient contributions into the
    /// tile as next-event connections back to the laser succeed.
    fn li(
        &self,
        scene: &Scene,
        capture: &CaptureRay,
        sampler: &mut dyn Sampler,
        tile: &mut TransientTile,
        p_film: &Point2i,
        hidden: Option<&HiddenGeometrySampler>,
    ) {
        let cfg = &self.config;
        let mut ray = capture.ray;
        let mut opl = capture.opl_offset;
        let mut throughput = Spectrum::new(1.0);
        let mut bounces: i32 = 0;
        let mut touched_hidden = false;

        let mut isect = match scene.intersect(&ray) {
            Some(i) => i,
            None => return,
        };
        opl += isect.t;

        loop {
            bounces += 1;
            if !isect.primitive.is_relay_wall() {
                touched_hidden = true;
            }

            // Next-event estimation back to the laser. Paths that have not
            // seen anything but the relay wall carry no hidden-geometry
            // information and can be rejected outright.
            if !(cfg.discard_direct_paths && !touched_hidden) {
                if cfg.nlos_laser_sampling {
                    self.connect_via_laser_spot(
                        scene,
                        &isect,
                        &capture.laser_spot,
                        &throughput,
                        opl,
                        bounces,
                        tile,
                        p_film,
                    );
                } else {
                    self.connect_to_laser(scene, &isect, &throughput, opl, bounces, tile, p_film);
                }
            }

            if cfg.max_depth != -1 && bounces >= cfg.max_depth {
                break;
            }
            // The path length only grows; once past the film's window no
            // later connection can land in it.
            if opl >= tile.end_opl() {
                break;
            }

            // Roulette runs before the bounce strategy is selected, so
            // only surviving paths consume strategy samples.
            if cfg.nlos_hidden_geometry_sampling_do_rroulette && bounces >= cfg.rr_depth {
                let q = throughput.max_component().min(0.95);
                if sampler.get_1d() >= q {
                    break;
                }
                throughput /= q;
            }

            let wo = -ray.d;
            let bxdf = isect.primitive.bxdf.clone();
            let dir = if let Some(hg) = hidden {
                // One-sample mixture of BSDF and hidden-geometry area
                // sampling; the mixture pdf below covers both branches.
                if sampler.get_1d() < 0.5 {
                    let u_select = sampler.get_1d();
                    let u = sampler.get_2d();
                    match hg.sample_dir(&isect.p, u_select, &u) {
                        Some(d) => d,
                        None => break,
                    }
                } else {
                    match bxdf.sample_f(&wo, &isect.n, &sampler.get_2d()) {
                        Some(s) => s.wi,
                        None => break,
                    }
                }
            } else {
                match bxdf.sample_f(&wo, &isect.n, &sampler.get_2d()) {
                    Some(s) => s.wi,
                    None => break,
                }
            };

            let f = bxdf.f(&wo, &isect.n, &dir);
            if f.is_black() {
                break;
            }
            let cos = dot_vec_normal(&dir, &isect.n).abs();
            let next_ray = isect.spawn_ray(&dir);
            let next = match scene.intersect(&next_ray) {
                Some(n) => n,
                None => break,
            };

            let pdf_bxdf = bxdf.pdf(&wo, &isect.n, &dir);
            let pdf = match hidden {
                Some(hg) => 0.5 * pdf_bxdf + 0.5 * hg.pdf_dir(&isect.p, &next),
                None => pdf_bxdf,
            };
            if !(pdf > 0.0) {
                break;
            }
            throughput *= f * (cos / pdf);
            if throughput.is_black() {
                break;
            }

            opl += next.t;
            ray = next_ray;
            isect = next;
        }

        StatsAccumulator::instance().report_int_distribution("Integrator/Path length", bounces as i64);
    }

    /// Delta next-event connection straight to the laser origin. Only
    /// vertices inside the projector cone receive anything.
    fn connect_to_laser(
        &self,
        scene: &Scene,
        isect: &SurfaceInteraction,
        throughput: &Spectrum,
        opl: Float,
        bounces: i32,
        tile: &mut TransientTile,
        p_film: &Point2i,
    ) {
        if self.config.filter_depth != -1 && bounces != self.config.filter_depth {
            return;
        }
        let li = scene.light.sample_li(&isect.p);
        if li.e.is_black() {
            return;
        }
        let f = isect.primitive.bxdf.f(&isect.wo, &isect.n, &li.wi);
        if f.is_black() {
            return;
        }
        let cos = dot_vec_normal(&li.wi, &isect.n).abs();
        if scene.intersect_p(&isect.spawn_ray_to(&scene.light.origin())) {
            return;
        }
        let l = *throughput * f * li.e * cos;
        tile.add_transient_sample(p_film, l, opl + li.dist);
    }

    /// Two-segment next-event connection through the laser's illuminated
    /// wall spot: vertex -> spot -> laser. The spot acts as an intermediate
    /// path vertex, so the recorded bounce count grows by one.
    fn connect_via_laser_spot(
        &self,
        scene: &Scene,
        isect: &SurfaceInteraction,
        spot: &Point3f,
        throughput: &Spectrum,
        opl: Float,
        bounces: i32,
        tile: &mut TransientTile,
        p_film: &Point2i,
    ) {
        let to_spot = *spot - isect.p;
        let r2 = to_spot.length_squared();
        if r2 < 1e-8 {
            // The vertex is the illuminated spot itself; the connection
            // degenerates to the direct one.
            self.connect_to_laser(scene, isect, throughput, opl, bounces, tile, p_film);
            return;
        }
        if self.config.filter_depth != -1 && bounces + 1 != self.config.filter_depth {
            return;
        }
        let r = r2.sqrt();
        let dir = to_spot / r;
        let f_vertex = isect.primitive.bxdf.f(&isect.wo, &isect.n, &dir);
        if f_vertex.is_black() {
            return;
        }
        let li = scene.light.sample_li(spot);
        if li.e.is_black() {
            return;
        }
        let wall = scene.relay_wall();
        let n_wall = wall.shape.normal_at(spot);
        let f_wall = wall.bxdf.f(&li.wi, &n_wall, &-dir);
        if f_wall.is_black() {
            return;
        }
        if scene.intersect_p(&isect.spawn_ray_to(spot)) {
            return;
        }
        let cos_vertex = dot_vec_normal(&dir, &isect.n).abs();
        let cos_spot = dot_vec_normal(&dir, &n_wall).abs();
        let cos_laser = dot_vec_normal(&li.wi, &n_wall).abs();
        let l = *throughput * f_vertex * f_wall * li.e * (cos_vertex * cos_spot * cos_laser / r2);
        tile.add_transient_sample(p_film, l, opl + r + li.dist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::light::ProjectorLight;
    use crate::core::options::{set_options, RenderOptions};
    use crate::core::primitive::SurfaceCategory;
    use crate::core::reflection::LambertianReflection;
    use crate::core::sampler::RandomSampler;
    use crate::core::shape::Rectangle;
    use crate::core::time_bin::TimeBinMapper;
    use crate::sensors::{LaserAim, NlosCaptureMeter};

    const RES: i32 = 8;
    const SPOT: Point3f = Point3f {
        x: 0.25,
        y: 0.0,
        z: 0.0,
    };

    fn wall_rect() -> Arc<Rectangle> {
        Arc::new(
            Rectangle::new(
                Point3f::new(-1.0, -1.0, 0.0),
                Vector3f::new(2.0, 0.0, 0.0),
                Vector3f::new(0.0, 2.0, 0.0),
            )
            .unwrap(),
        )
    }

    fn wall_prim() -> Arc<Primitive> {
        Arc::new(Primitive::new(
            wall_rect(),
            Arc::new(LambertianReflection::new(Spectrum::new(0.7))),
            SurfaceCategory::RelayWall,
            "relay-wall",
        ))
    }

    // A diffuse patch facing the wall, off to the side of the scanned
    // region so it never occludes primary rays.
    fn hidden_prim() -> Arc<Primitive> {
        Arc::new(Primitive::new(
            Arc::new(
                Rectangle::new(
                    Point3f::new(0.6, -0.5, 0.6),
                    Vector3f::new(0.0, 1.0, 0.0),
                    Vector3f::new(1.0, 0.0, 0.0),
                )
                .unwrap(),
            ),
            Arc::new(LambertianReflection::new(Spectrum::new(0.6))),
            SurfaceCategory::HiddenGeometry,
            "hidden-patch",
        ))
    }

    fn build_scene(with_hidden: bool, fov_degrees: Float) -> Scene {
        let mut prims = vec![wall_prim()];
        if with_hidden {
            prims.push(hidden_prim());
        }
        let light = Arc::new(
            ProjectorLight::new(
                Point3f::new(0.3, 0.0, 1.0),
                SPOT,
                fov_degrees,
                Spectrum::new(10.0),
            )
            .unwrap(),
        );
        Scene::new(prims, light).unwrap()
    }

    fn build_sensor(confocal: bool, account: bool) -> Arc<NlosCaptureMeter> {
        let sensor_origin = Point3f::new(0.0, 0.0, 1.0);
        let laser_origin = if confocal {
            sensor_origin
        } else {
            Point3f::new(0.3, 0.0, 1.0)
        };
        Arc::new(
            NlosCaptureMeter::new(
                wall_rect(),
                Point2i::new(RES, RES),
                sensor_origin,
                laser_origin,
                LaserAim::Point3d(SPOT),
                confocal,
                account,
            )
            .unwrap(),
        )
    }

    fn render(
        config: NlosConfig,
        scene: &Scene,
        sensor: Arc<NlosCaptureMeter>,
        spp: u32,
        bins: i64,
        bin_width: Float,
    ) -> Arc<TransientFilm> {
        set_options(RenderOptions {
            quiet: true,
            n_threads: 0,
        });
        let filter = config.temporal_filter.create().unwrap();
        let film = Arc::new(
            TransientFilm::new(
                Point2i::new(RES, RES),
                TimeBinMapper::new(0.0, bin_width, bins).unwrap(),
                filter,
            )
            .unwrap(),
        );
        let sampler = Arc::new(RandomSampler::new(spp, config.seed));
        let integrator =
            TransientPathIntegrator::new(config, sensor, film.clone(), sampler).unwrap();
        integrator.render(scene);
        film
    }

    fn base_config() -> NlosConfig {
        NlosConfig {
            block_size: 4,
            seed: 7,
            ..NlosConfig::default()
        }
    }

    fn first_nonzero_bin(film: &TransientFilm) -> Option<usize> {
        for b in 0..film.n_bins() {
            for p in &film.pixel_bounds() {
                if film.accumulated(&p, b).y() > 0.0 {
                    return Some(b);
                }
            }
        }
        None
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let mut c = base_config();
        c.block_size = 0;
        assert!(c.validate().is_err());
        let mut c = base_config();
        c.max_depth = 0;
        assert!(c.validate().is_err());
        let mut c = base_config();
        c.filter_depth = -2;
        assert!(c.validate().is_err());
        let mut c = base_config();
        c.temporal_filter = TemporalFilterSpec::Gaussian { stddev: 0.0 };
        assert!(c.validate().is_err());
        assert!(base_config().validate().is_ok());
        assert!(TemporalFilterSpec::from_name("median", 1.0).is_err());
        assert!(TemporalFilterSpec::from_name("box", 1.0).is_ok());
    }

    #[test]
    fn resolution_mismatch_is_rejected() {
        let film = Arc::new(
            TransientFilm::new(
                Point2i::new(4, 4),
                TimeBinMapper::new(0.0, 0.05, 64).unwrap(),
                Arc::new(BoxFilter::new()),
            )
            .unwrap(),
        );
        let sampler = Arc::new(RandomSampler::new(1, 0));
        let r = TransientPathIntegrator::new(base_config(), build_sensor(false, true), film, sampler);
        assert!(r.is_err());
    }

    #[test]
    fn identical_seeds_render_identical_films() {
        let scene = build_scene(true, 2.0);
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        let a = render(config.clone(), &scene, build_sensor(false, true), 4, 256, 0.05);
        let b = render(config, &scene, build_sensor(false, true), 4, 256, 0.05);
        assert!(a.total_energy() > 0.0);
        assert_eq!(a.develop(), b.develop());
    }

    #[test]
    fn direct_paths_are_discarded_when_requested() {
        // No hidden geometry: every possible path is wall-only.
        let scene = build_scene(false, 60.0);
        let mut config = base_config();
        config.discard_direct_paths = true;
        let film = render(config, &scene, build_sensor(false, true), 2, 256, 0.05);
        assert_eq!(film.total_energy(), 0.0);

        let mut config = base_config();
        config.discard_direct_paths = false;
        let film = render(config, &scene, build_sensor(false, true), 2, 256, 0.05);
        assert!(film.total_energy() > 0.0);
    }

    #[test]
    fn filter_depth_records_exact_bounce_orders() {
        // Wall only, direct connections: every recorded path has one
        // surface bounce.
        let scene = build_scene(false, 60.0);
        let mut config = base_config();
        config.discard_direct_paths = false;
        config.filter_depth = 1;
        let film = render(config, &scene, build_sensor(false, true), 2, 256, 0.05);
        assert!(film.total_energy() > 0.0);

        let mut config = base_config();
        config.discard_direct_paths = false;
        config.filter_depth = 2;
        let film = render(config, &scene, build_sensor(false, true), 2, 256, 0.05);
        assert_eq!(film.total_energy(), 0.0);

        // Hidden patch via laser sampling: the three-bounce transport
        // wall -> hidden -> laser spot is recorded at filter_depth 3 and
        // nothing lands at filter_depth 4 (a fourth vertex would have to
        // connect to the spot from within the wall plane).
        let scene = build_scene(true, 2.0);
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        config.filter_depth = 3;
        let film = render(config, &scene, build_sensor(false, true), 16, 512, 0.05);
        assert!(film.total_energy() > 0.0);

        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        config.filter_depth = 4;
        let film = render(config, &scene, build_sensor(false, true), 16, 512, 0.05);
        assert_eq!(film.total_energy(), 0.0);
    }

    #[test]
    fn max_depth_bounds_path_extension() {
        let scene = build_scene(true, 2.0);
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        config.max_depth = 1;
        let film = render(config, &scene, build_sensor(false, true), 8, 512, 0.05);
        assert_eq!(film.total_energy(), 0.0);

        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        config.max_depth = 2;
        let film = render(config, &scene, build_sensor(false, true), 8, 512, 0.05);
        assert!(film.total_energy() > 0.0);
    }

    #[test]
    fn excluding_fixed_segments_shifts_the_time_axis_earlier() {
        let scene = build_scene(true, 2.0);
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        let with = render(config.clone(), &scene, build_sensor(false, true), 16, 512, 0.05);
        let without = render(config, &scene, build_sensor(false, false), 16, 512, 0.05);
        let first_with = first_nonzero_bin(&with).unwrap();
        let first_without = first_nonzero_bin(&without).unwrap();
        assert!(first_without < first_with);
    }

    #[test]
    fn out_of_window_contributions_are_dropped_not_fatal() {
        let scene = build_scene(false, 120.0);
        let mut config = base_config();
        config.discard_direct_paths = false;
        // A window far too short for any physical path length.
        let film = render(config, &scene, build_sensor(false, true), 2, 4, 0.05);
        assert_eq!(film.total_energy(), 0.0);
        assert!(film.dropped_samples() > 0);
    }

    #[test]
    fn confocal_capture_renders() {
        let scene = Scene::new(
            vec![wall_prim(), hidden_prim()],
            Arc::new(
                ProjectorLight::new(
                    Point3f::new(0.0, 0.0, 1.0),
                    Point3f::zero(),
                    120.0,
                    Spectrum::new(10.0),
                )
                .unwrap(),
            ),
        )
        .unwrap();
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        let film = render(config, &scene, build_sensor(true, true), 8, 512, 0.05);
        assert!(film.total_energy() > 0.0);
        assert!(film.develop().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn roulette_and_relay_wall_targets_stay_finite() {
        let scene = build_scene(true, 2.0);
        let mut config = base_config();
        config.nlos_laser_sampling = true;
        config.nlos_hidden_geometry_sampling = true;
        config.nlos_hidden_geometry_sampling_includes_relay_wall = true;
        config.nlos_hidden_geometry_sampling_do_rroulette = true;
        config.rr_depth = 2;
        let film = render(config, &scene, build_sensor(false, true), 8, 512, 0.05);
        assert!(film.total_energy() > 0.0);
        assert!(film.develop().iter().all(|v| v.is_finite()));
        assert_eq!(film.degenerate_samples(), 0);
    }

    #[test]
    fn abort_token_skips_pending_blocks() {
        let scene = build_scene(true, 2.0);
        set_options(RenderOptions {
            quiet: true,
            n_threads: 0,
        });
        let config = base_config();
        let film = Arc::new(
            TransientFilm::new(
                Point2i::new(RES, RES),
                TimeBinMapper::new(0.0, 0.05, 64).unwrap(),
                Arc::new(BoxFilter::new()),
            )
            .unwrap(),
        );
        let sampler = Arc::new(RandomSampler::new(2, 0));
        let integrator =
            TransientPathIntegrator::new(config, build_sensor(false, true), film.clone(), sampler)
                .unwrap();
        integrator.abort_token().store(true, Ordering::Relaxed);
        integrator.render(&scene);
        assert_eq!(film.total_energy(), 0.0);
    }
}
