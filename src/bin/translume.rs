//! Renders a small built-in capture scene: a relay wall scanned by the
//! sensor, a laser aimed at the wall, and hidden geometry off to the side.
//! Writes the transient volume and a time-integrated preview image.
#[macro_use]
extern crate log;

use std::process::exit;
use std::sync::Arc;

use translume::core::error::ConfigError;
use translume::core::film::TransientFilm;
use translume::core::geometry::{Point2i, Point3f, Vector3f};
use translume::core::light::ProjectorLight;
use translume::core::options::{set_options, RenderOptions};
use translume::core::pbrt::{Float, Spectrum};
use translume::core::primitive::{Primitive, SurfaceCategory};
use translume::core::reflection::LambertianReflection;
use translume::core::sampler::RandomSampler;
use translume::core::scene::Scene;
use translume::core::shape::{Rectangle, Sphere};
use translume::core::stats_accumulator::StatsAccumulator;
use translume::core::time_bin::TimeBinMapper;
use translume::core::vlog::set_log_level;
use translume::integrators::{NlosConfig, TemporalFilterSpec, TransientPathIntegrator};
use translume::sensors::{LaserAim, NlosCaptureMeter};

struct Args {
    spp: u32,
    seed: u64,
    resolution: i32,
    bins: i64,
    bin_width: Float,
    confocal: bool,
    account_first_and_last_bounces: bool,
    filter: String,
    stddev: Float,
    out: String,
    quiet: bool,
    verbosity: usize,
}

impl Default for Args {
    fn default() -> Args {
        Args {
            spp: 64,
            seed: 0,
            resolution: 32,
            bins: 600,
            bin_width: 0.01,
            confocal: false,
            account_first_and_last_bounces: false,
            filter: String::from("box"),
            stddev: 2.0,
            out: String::from("capture"),
            quiet: false,
            verbosity: 0,
        }
    }
}

fn usage() -> ! {
    eprintln!("usage: translume [options]");
    eprintln!("  --spp <n>        samples per pixel (default 64)");
    eprintln!("  --seed <n>       random seed (default 0)");
    eprintln!("  --res <n>        scan resolution per side (default 32)");
    eprintln!("  --bins <n>       temporal bins (default 600)");
    eprintln!("  --bin-width <f>  bin width in optical path length (default 0.01)");
    eprintln!("  --filter <name>  temporal filter: box | gaussian (default box)");
    eprintln!("  --stddev <f>     gaussian filter stddev in bins (default 2.0)");
    eprintln!("  --confocal       co-locate laser and sensor per pixel");
    eprintln!("  --full-opl       include sensor/laser wall segments in path length");
    eprintln!("  --out <prefix>   output prefix (default \"capture\")");
    eprintln!("  --quiet          suppress the progress bar");
    eprintln!("  -v <n>           verbosity level");
    exit(1)
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| it.next().unwrap_or_else(|| {
            eprintln!("missing value for {}", name);
            usage()
        });
        match arg.as_str() {
            "--spp" => args.spp = value("--spp").parse().unwrap_or_else(|_| usage()),
            "--seed" => args.seed = value("--seed").parse().unwrap_or_else(|_| usage()),
            "--res" => args.resolution = value("--res").parse().unwrap_or_else(|_| usage()),
            "--bins" => args.bins = value("--bins").parse().unwrap_or_else(|_| usage()),
            "--bin-width" => args.bin_width = value("--bin-width").parse().unwrap_or_else(|_| usage()),
            "--filter" => args.filter = value("--filter"),
            "--stddev" => args.stddev = value("--stddev").parse().unwrap_or_else(|_| usage()),
            "--confocal" => args.confocal = true,
            "--full-opl" => args.account_first_and_last_bounces = true,
            "--out" => args.out = value("--out"),
            "--quiet" => args.quiet = true,
            "-v" => args.verbosity = value("-v").parse().unwrap_or_else(|_| usage()),
            _ => usage(),
        }
    }
    args
}

/// The demo capture: a 2x2 m relay wall in the z = 0 plane, a hidden patch
/// and a hidden sphere around the corner, sensor and laser half a meter in
/// front of the wall.
fn build_scene(
    wall: Arc<Rectangle>,
    confocal: bool,
    sensor_origin: Point3f,
) -> Result<Scene, ConfigError> {
    let patch = Arc::new(Rectangle::new(
        Point3f::new(0.7, -0.5, 0.7),
        Vector3f::new(0.0, 1.0, 0.0),
        Vector3f::new(0.8, 0.0, 0.0),
    )?);
    let ball = Arc::new(Sphere::new(Point3f::new(1.0, 0.6, 0.5), 0.25)?);

    let primitives = vec![
        Arc::new(Primitive::new(
            wall,
            Arc::new(LambertianReflection::new(Spectrum::new(0.7))),
            SurfaceCategory::RelayWall,
            "relay-wall",
        )),
        Arc::new(Primitive::new(
            patch,
            Arc::new(LambertianReflection::new(Spectrum::from_rgb([0.2, 0.6, 0.3]))),
            SurfaceCategory::HiddenGeometry,
            "hidden-patch",
        )),
        Arc::new(Primitive::new(
            ball,
            Arc::new(LambertianReflection::new(Spectrum::from_rgb([0.7, 0.3, 0.2]))),
            SurfaceCategory::HiddenGeometry,
            "hidden-ball",
        )),
    ];

    let (laser_origin, look_at, fov) = if confocal {
        // The confocal laser scans with the sensor; it needs to reach the
        // whole wall from the sensor position.
        (sensor_origin, Point3f::new(0.0, 0.0, 0.0), 150.0)
    } else {
        (Point3f::new(0.3, 0.0, 1.0), Point3f::new(0.25, 0.0, 0.0), 2.0)
    };
    let light = Arc::new(ProjectorLight::new(
        laser_origin,
        look_at,
        fov,
        Spectrum::new(25.0),
    )?);

    Scene::new(primitives, light)
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let sensor_origin = Point3f::new(0.0, 0.0, 1.0);
    let wall = Arc::new(Rectangle::new(
        Point3f::new(-1.0, -1.0, 0.0),
        Vector3f::new(2.0, 0.0, 0.0),
        Vector3f::new(0.0, 2.0, 0.0),
    )?);
    let scene = build_scene(wall.clone(), args.confocal, sensor_origin)?;

    let resolution = Point2i::new(args.resolution, args.resolution);
    let laser_origin = if args.confocal {
        sensor_origin
    } else {
        Point3f::new(0.3, 0.0, 1.0)
    };
    let sensor = Arc::new(NlosCaptureMeter::new(
        wall,
        resolution,
        sensor_origin,
        laser_origin,
        LaserAim::Point3d(Point3f::new(0.25, 0.0, 0.0)),
        args.confocal,
        args.account_first_and_last_bounces,
    )?);

    let config = NlosConfig {
        nlos_laser_sampling: true,
        nlos_hidden_geometry_sampling: true,
        nlos_hidden_geometry_sampling_do_rroulette: true,
        temporal_filter: TemporalFilterSpec::from_name(&args.filter, args.stddev)?,
        seed: args.seed,
        ..NlosConfig::default()
    };

    let film = Arc::new(TransientFilm::new(
        resolution,
        TimeBinMapper::new(0.0, args.bin_width, args.bins)?,
        config.temporal_filter.create()?,
    )?);
    let sampler = Arc::new(RandomSampler::new(args.spp, args.seed));
    let integrator = TransientPathIntegrator::new(config, sensor, film.clone(), sampler)?;

    let start = std::time::Instant::now();
    integrator.render(&scene);
    info!(
        "Render took {:.1}s",
        start.elapsed().as_millis() as f64 / 1000.0
    );
    if film.dropped_samples() > 0 {
        warn!(
            "{} contributions fell outside the temporal window",
            film.dropped_samples()
        );
    }

    let volume = format!("{}.trans", args.out);
    let preview = format!("{}.png", args.out);
    if let Err(e) = film.write_raw(&volume) {
        error!("Failed to write {}: {}", volume, e);
    }
    if let Err(e) = film.write_steady_png(&preview) {
        error!("Failed to write {}: {}", preview, e);
    }
    StatsAccumulator::instance().print_stats();
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();
    set_options(RenderOptions {
        quiet: args.quiet,
        n_threads: 0,
    });
    set_log_level(args.verbosity);

    if let Err(e) = run(&args) {
        error!("{}", e);
        exit(1);
    }
}
