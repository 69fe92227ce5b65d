use clap::ValueEnum;
use rand::Rng;

use crate::integrator::{get_color, get_color_pathtrace};
use crate::ray::Ray;
use crate::rng::pixel_rng;
use crate::scene::Scene;
use crate::vec3::{Color, Point3, Vec3};

/// Which integrator the camera's render loop calls per sample (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceAlgorithm {
    #[value(name = "raytracing")]
    RayTracing,
    #[value(name = "pathtracing")]
    PathTracing,
}

impl TraceAlgorithm {
    /// Default recursion depth for this algorithm when the caller doesn't
    /// override it (§4.9).
    pub fn default_max_depth(self) -> u32 {
        match self {
            TraceAlgorithm::RayTracing => 5,
            TraceAlgorithm::PathTracing => 7,
        }
    }
}

/// Configuration for the orthonormal-basis camera. There is no depth-of-field
/// term — the reference camera this replaces is a pinhole camera, not a
/// thin-lens one.
pub struct CameraConfig {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: Vec3,
    pub vfov_degrees: f64,
    pub image_width: u32,
    pub image_height: u32,
    pub samples_per_pixel: u32,
    pub trace_algorithm: TraceAlgorithm,
    pub max_depth: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Point3::new(0.0, 1.0, 3.0),
            look_at: Point3::zero(),
            vup: Vec3::unit_y(),
            vfov_degrees: 40.0,
            image_width: 640,
            image_height: 360,
            samples_per_pixel: 16,
            trace_algorithm: TraceAlgorithm::RayTracing,
            max_depth: TraceAlgorithm::RayTracing.default_max_depth(),
        }
    }
}

/// An orthonormal-basis camera: `u, v, w` built from `look_from`/`look_at`/
/// `vup`, a virtual image plane one unit in front of the eye, and jittered
/// per-sample sub-pixel offsets (§4.8).
pub struct Camera {
    origin: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    trace_algorithm: TraceAlgorithm,
    max_depth: u32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        let theta = config.vfov_degrees.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let aspect_ratio = config.image_width as f64 / config.image_height as f64;
        let viewport_width = aspect_ratio * viewport_height;

        let w = (config.look_from - config.look_at).normalized();
        let u = config.vup.cross(w).normalized();
        let v = w.cross(u);

        let viewport_u = u * viewport_width;
        let viewport_v = -v * viewport_height;

        let pixel_delta_u = viewport_u / config.image_width as f64;
        let pixel_delta_v = viewport_v / config.image_height as f64;

        let viewport_upper_left = config.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + (pixel_delta_u + pixel_delta_v) * 0.5;

        Self {
            origin: config.look_from,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            image_width: config.image_width,
            image_height: config.image_height,
            samples_per_pixel: config.samples_per_pixel,
            trace_algorithm: config.trace_algorithm,
            max_depth: config.max_depth,
        }
    }

    /// Builds the primary ray through pixel `(i, j)` for one sample. The
    /// jitter offset is sampled from `[-1, 0)` rather than the symmetric
    /// `[-0.5, 0.5)` a box filter would use, biasing every sample toward the
    /// pixel's upper-left neighbor (§9 open question 2). Preserved verbatim.
    ///
    /// The resulting direction is `pixel_sample - origin`, left un-normalized
    /// (§9 open question 4) — downstream intersection and shading code must
    /// tolerate non-unit ray directions.
    fn get_ray(&self, i: u32, j: u32, rng: &mut dyn rand::RngCore) -> Ray {
        let offset_x: f64 = rng.gen_range(-1.0..0.0);
        let offset_y: f64 = rng.gen_range(-1.0..0.0);
        let pixel_sample = self.pixel00_loc
            + self.pixel_delta_u * (i as f64 + offset_x)
            + self.pixel_delta_v * (j as f64 + offset_y);
        Ray::primary(self.origin, pixel_sample - self.origin)
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Renders the full image for a deterministic `frame_seed`, returning a
    /// tightly packed `height * width * 3` RGB8 buffer (§6 "Render output").
    pub fn render(&self, scene: &Scene, frame_seed: u64) -> Vec<u8> {
        let mut buffer = vec![0u8; (self.image_width * self.image_height * 3) as usize];

        for j in 0..self.image_height {
            for i in 0..self.image_width {
                let mut rng = pixel_rng(frame_seed, i, j);
                let mut accum = Color::zero();
                for _ in 0..self.samples_per_pixel {
                    let ray = self.get_ray(i, j, &mut rng);
                    let sample = match self.trace_algorithm {
                        TraceAlgorithm::RayTracing => {
                            get_color(scene, &ray, 0, self.max_depth, &mut rng)
                        }
                        TraceAlgorithm::PathTracing => {
                            get_color_pathtrace(scene, &ray, 0, self.max_depth, &mut rng)
                        }
                    };
                    accum += sample;
                }

                let (r, g, b) = accum.to_rgb8_averaged(self.samples_per_pixel);
                let idx = ((j * self.image_width + i) * 3) as usize;
                buffer[idx] = r;
                buffer[idx + 1] = g;
                buffer[idx + 2] = b;
            }
        }

        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::AccelerationChoice;
    use crate::scene::Scene;

    #[test]
    fn render_buffer_has_expected_length() {
        let config = CameraConfig {
            image_width: 8,
            image_height: 4,
            samples_per_pixel: 2,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        let scene = Scene::build(Vec::new(), AccelerationChoice::Bvh, Vec::new(), 0.1);
        let buffer = camera.render(&scene, 7);
        assert_eq!(buffer.len(), 8 * 4 * 3);
    }

    #[test]
    fn same_frame_seed_renders_deterministically() {
        let config = CameraConfig {
            image_width: 6,
            image_height: 6,
            samples_per_pixel: 4,
            ..Default::default()
        };
        let camera = Camera::new(&config);
        let scene = Scene::build(Vec::new(), AccelerationChoice::Bvh, Vec::new(), 0.1);
        let a = camera.render(&scene, 99);
        let b = camera.render(&scene, 99);
        assert_eq!(a, b);
    }
}
