//! # photon-trace
//!
//! A CPU ray/path tracer over OBJ scenes with four interchangeable spatial
//! acceleration structures — a triangle BVH, a mesh BVH, a KD-tree with
//! Ingo-Wald ordered traversal, and a uniform grid traversed with
//! Amanatides-Woo DDA — plus an unaccelerated brute-force path for
//! benchmarking them against.
//!
//! ## Architecture
//!
//! - **Geometry**: `Triangle` (Möller–Trumbore), `Mesh`, `Aabb`
//! - **Acceleration**: `accel::{bvh_triangle, bvh_mesh, kdtree, grid}`
//! - **Shading**: Whitted-style ray tracing and fixed-depth Monte Carlo
//!   path tracing, both driven by a tagged `IlluminationModel` rather than
//!   dynamic dispatch on material type
//! - **Output**: a packed RGB8 framebuffer, displayed to the terminal or
//!   written out as a PPM image

mod accel;
mod aabb;
mod bench;
mod camera;
mod config;
mod display;
mod error;
mod hit;
mod integrator;
mod light;
mod loader;
mod material;
mod mesh;
mod ray;
mod rng;
mod scene;
mod triangle;
mod vec3;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use accel::AccelerationChoice;
use bench::RenderStats;
use camera::{Camera, CameraConfig, TraceAlgorithm};
use display::OutputMode;
use error::SceneError;
use scene::Scene;
use vec3::{Point3, Vec3};

/// photon-trace — CPU ray/path tracer with pluggable acceleration structures
#[derive(Parser, Debug)]
#[command(
    name = "photon-trace",
    version,
    about = "A CPU ray/path tracer with interchangeable spatial acceleration structures",
    after_help = "EXAMPLES:\n  \
                  photon-trace --scene teapot.obj --acceleration-structure bvh\n  \
                  photon-trace --scene cornell.obj --scene-config cornell.json --trace-algorithm pathtracing\n  \
                  photon-trace --scene bunny.obj --acceleration-structure kd-tree --width 320 --height 180"
)]
struct Cli {
    /// Path to the OBJ scene file
    #[arg(long)]
    scene: PathBuf,

    /// Path to the scene's lighting JSON config
    #[arg(long)]
    scene_config: Option<PathBuf>,

    /// Which spatial acceleration structure to build over the scene
    #[arg(long, value_enum, default_value_t = AccelerationChoice::Bvh)]
    acceleration_structure: AccelerationChoice,

    /// Which integrator to render with
    #[arg(long, value_enum, default_value_t = TraceAlgorithm::RayTracing)]
    trace_algorithm: TraceAlgorithm,

    /// Output image width in pixels
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Output image height in pixels
    #[arg(long, default_value_t = 180)]
    height: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 40.0)]
    fov: f64,

    /// Samples per pixel
    #[arg(long, default_value_t = 16)]
    samples: u32,

    /// Maximum ray recursion depth; defaults to the integrator's own default
    #[arg(long)]
    max_depth: Option<u32>,

    /// Terminal output encoding mode
    #[arg(long, value_enum, default_value_t = OutputMode::HalfBlock)]
    mode: OutputMode,

    /// Write the rendered frame to a PPM file instead of the terminal
    #[arg(long)]
    output: Option<PathBuf>,

    /// Deterministic RNG seed for the render
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write an efficiency report under this directory
    #[arg(long)]
    bench_dir: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<(), SceneError> {
    let meshes = loader::load_obj(&cli.scene)?;

    let (ambient_light, lights) = match &cli.scene_config {
        Some(path) => {
            let cfg = config::load_scene_config(path)?;
            (cfg.ambient_light, cfg.lights)
        }
        None => (0.1, Vec::new()),
    };

    let scene = Scene::build(meshes, cli.acceleration_structure, lights, ambient_light);

    let look_from = scene_bounds_eye(&scene);
    let camera_config = CameraConfig {
        look_from,
        look_at: Point3::zero(),
        vup: Vec3::unit_y(),
        vfov_degrees: cli.fov,
        image_width: cli.width,
        image_height: cli.height,
        samples_per_pixel: cli.samples,
        trace_algorithm: cli.trace_algorithm,
        max_depth: cli.max_depth.unwrap_or(cli.trace_algorithm.default_max_depth()),
    };
    let camera = Camera::new(&camera_config);

    eprintln!(
        "photon-trace: {}x{} @ {} spp, {:?} / {:?}",
        cli.width, cli.height, cli.samples, cli.acceleration_structure, cli.trace_algorithm
    );

    let t0 = Instant::now();
    let buffer = camera.render(&scene, cli.seed);
    let render_time = t0.elapsed();

    let stats = RenderStats {
        render_time,
        pixel_count: (cli.width * cli.height) as u64,
        peak_rss_mb: bench::current_rss_mb(),
    };
    eprintln!(
        "  {:.2}s, {:.0} px/s, {:.1} MB RSS",
        stats.render_time.as_secs_f64(),
        stats.pixels_per_second(),
        stats.peak_rss_mb
    );

    if let Some(dir) = &cli.bench_dir {
        bench::write_efficiency_report(dir, cli.acceleration_structure, cli.trace_algorithm, &stats)?;
    }

    match &cli.output {
        Some(path) => display::write_ppm(path, &buffer, camera.image_width(), camera.image_height())?,
        None => display::display_frame(&buffer, camera.image_width(), camera.image_height(), cli.mode),
    }

    Ok(())
}

/// Picks a default eye position looking at the origin from outside the
/// scene's own bounding box — good enough for a scene with no explicit
/// camera block in its config (§6, Open Question: camera placement).
fn scene_bounds_eye(scene: &Scene) -> Point3 {
    if scene.meshes.is_empty() {
        return Point3::new(0.0, 1.0, 3.0);
    }
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for mesh in &scene.meshes {
        min = Point3::new(min.x.min(mesh.bbox_min.x), min.y.min(mesh.bbox_min.y), min.z.min(mesh.bbox_min.z));
        max = Point3::new(max.x.max(mesh.bbox_max.x), max.y.max(mesh.bbox_max.y), max.z.max(mesh.bbox_max.z));
    }
    let center = (min + max) * 0.5;
    let radius = (max - min).length().max(1.0);
    center + Vec3::new(0.0, radius * 0.4, radius * 1.2)
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("photon-trace: {err}");
        std::process::exit(1);
    }
}
