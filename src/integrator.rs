use rand::Rng;

use crate::light::Light;
use crate::material::IlluminationModel;
use crate::ray::Ray;
use crate::scene::Scene;
use crate::triangle::Triangle;
use crate::vec3::{Color, Point3, Vec3};

const SKY_TOP: Color = Vec3::new(0.5, 0.7, 1.0);
const SKY_BOTTOM: Color = Vec3::ones();

/// Background color for rays that escape the scene entirely: a vertical
/// gradient from white at the horizon to pale blue at the top, sampled by
/// the ray's own (non-normalized) direction.
fn sky(ray: &Ray) -> Color {
    let unit_dir = ray.direction.normalized();
    let t = 0.5 * (unit_dir.y + 1.0);
    SKY_BOTTOM.lerp(SKY_TOP, t)
}

fn outward_normal(tri: &Triangle, ray: &Ray) -> Vec3 {
    if tri.unit_norm.dot(ray.direction) < 0.0 {
        tri.unit_norm
    } else {
        -tri.unit_norm
    }
}

/// Phong local illumination at a hit point, summing every light in `lights`'
/// diffuse and specular contribution plus the scene's flat ambient term.
///
/// Each light's contribution is written into `acc` directly rather than
/// summed into a running local and added once — `illum = 2` diffuse
/// surfaces therefore end up lit only by whichever light was iterated last,
/// not the sum of all lights (§9 open question 1). This is preserved
/// verbatim rather than fixed.
///
/// The shadow ray originates at `point + 1e-3 * tri.unit_norm` — the face's
/// raw (un-flipped) normal, matching §4.9.1's illum=2 formula rather than
/// the entry/exit-aware `normal` this function also receives for shading.
fn phong_shade(scene: &Scene, point: Point3, normal: Vec3, view_dir: Vec3, tri: &Triangle, lights: &[Light]) -> Color {
    let mat = &tri.material;
    let mut acc = mat.ambient * scene.ambient_light;

    for light in lights {
        let to_light = light.position - point;
        let distance = to_light.length();
        let light_dir = to_light / distance;

        let shadow_origin = point + tri.unit_norm * 1e-3;
        let shadow_ray = Ray::new(shadow_origin, light_dir, 1e-3, distance);
        if scene.hit(&shadow_ray).is_some() {
            continue;
        }

        let diffuse_term = normal.dot(light_dir).max(0.0);
        let reflect_dir = (-light_dir).reflect(normal);
        let specular_term = reflect_dir.dot(view_dir).max(0.0).powf(mat.shininess.max(1.0));

        let contribution = mat.diffuse * (diffuse_term * light.intensity)
            + mat.specular * (specular_term * light.intensity);
        acc = mat.ambient * scene.ambient_light + contribution.hadamard(light.color);
    }

    acc
}

/// Whitted-style recursive ray tracing: Phong shading for diffuse surfaces,
/// perfect specular reflection for mirrors, and Fresnel-weighted
/// reflect/refract for dielectrics (§4.9.1).
pub fn get_color(
    scene: &Scene,
    ray: &Ray,
    depth: u32,
    max_depth: u32,
    rng: &mut dyn rand::RngCore,
) -> Color {
    if depth >= max_depth {
        return Color::zero();
    }

    let hit = match scene.hit(ray) {
        Some(h) => h,
        None => return sky(ray),
    };
    let tri = hit.triangle;
    let point = hit.point;
    let normal = outward_normal(tri, ray);
    let view_dir = -ray.direction.normalized();

    match tri.material.illumination_model {
        IlluminationModel::Diffuse => phong_shade(scene, point, normal, view_dir, tri, &scene.lights),
        IlluminationModel::Mirror => {
            let reflected = ray.direction.normalized().reflect(normal);
            let reflect_ray = Ray::spawned(point, reflected);
            let reflect_color = get_color(scene, &reflect_ray, depth + 1, max_depth, rng);

            // illum=3 blends a Phong term computed against lights[0] only
            // with the mirror reflection, rather than ignoring local
            // shading entirely (§4.9.1).
            let first_light = scene.lights.get(0..1).unwrap_or(&[]);
            let phong = phong_shade(scene, point, normal, view_dir, tri, first_light);
            phong * 0.3 + reflect_color * 0.7
        }
        IlluminationModel::Dielectric => {
            let eta_ratio = if ray.direction.dot(tri.unit_norm) < 0.0 {
                1.0 / tri.material.optical_density.max(1e-6)
            } else {
                tri.material.optical_density
            };

            let unit_dir = ray.direction.normalized();

            // Schlick's approximation using the *signed* cosine between the
            // incoming ray and the triangle's raw (un-flipped) normal, not
            // the entry/exit-aware `normal` used for reflect/refract above
            // and not the clamped |cos θ| a physically exact implementation
            // would use — the reflectance can therefore come out large and
            // saturating on internal (exiting) rays (§9 open question 3).
            // Preserved verbatim.
            let cos_theta = (-unit_dir).dot(tri.unit_norm).min(1.0);

            let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
            let reflectance = r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5);

            let cannot_refract = unit_dir.refract(normal, eta_ratio).is_none();
            let direction = if cannot_refract || reflectance > rng.gen::<f64>() {
                unit_dir.reflect(normal)
            } else {
                unit_dir.refract(normal, eta_ratio).unwrap()
            };

            let bounce_origin = point + direction * 1e-3;
            let bounce_ray = Ray::new(bounce_origin, direction, 1e-3, f64::INFINITY);
            get_color(scene, &bounce_ray, depth + 1, max_depth, rng)
        }
    }
}

/// Fixed-depth Monte Carlo path tracing: diffuse surfaces bounce into a
/// cosine-weighted-by-rejection hemisphere sample, mirrors and dielectrics
/// follow the same deterministic reflect/refract as the Whitted integrator,
/// and every hit accumulates the material's emissive term (§4.9.2).
pub fn get_color_pathtrace(
    scene: &Scene,
    ray: &Ray,
    depth: u32,
    max_depth: u32,
    rng: &mut dyn rand::RngCore,
) -> Color {
    if depth >= max_depth {
        return sky(ray);
    }

    let hit = match scene.hit(ray) {
        Some(h) => h,
        None => return sky(ray),
    };
    let tri = hit.triangle;
    let point = hit.point;
    let normal = outward_normal(tri, ray);
    let emitted = tri.material.emissive;

    let scattered = match tri.material.illumination_model {
        IlluminationModel::Diffuse => {
            let bounce_dir = Vec3::random_in_hemisphere(normal, rng);
            let bounce_ray = Ray::spawned(point, bounce_dir);
            let incoming = get_color_pathtrace(scene, &bounce_ray, depth + 1, max_depth, rng);
            tri.material.diffuse.hadamard(incoming)
        }
        IlluminationModel::Mirror => {
            let reflected = ray.direction.normalized().reflect(normal);
            let reflect_origin = point + normal * 1e-4;
            let reflect_ray = Ray::new(reflect_origin, reflected, 1e-4, f64::INFINITY);
            let incoming = get_color_pathtrace(scene, &reflect_ray, depth + 1, max_depth, rng);
            tri.material.diffuse.hadamard(incoming)
        }
        IlluminationModel::Dielectric => {
            let eta_ratio = if ray.direction.dot(tri.unit_norm) < 0.0 {
                1.0 / tri.material.optical_density.max(1e-6)
            } else {
                tri.material.optical_density
            };
            let unit_dir = ray.direction.normalized();
            let cos_theta = (-unit_dir).dot(tri.unit_norm).min(1.0);
            let r0 = ((1.0 - eta_ratio) / (1.0 + eta_ratio)).powi(2);
            let reflectance = r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5);

            let cannot_refract = unit_dir.refract(normal, eta_ratio).is_none();
            let direction = if cannot_refract || reflectance > rng.gen::<f64>() {
                unit_dir.reflect(normal)
            } else {
                unit_dir.refract(normal, eta_ratio).unwrap()
            };
            let bounce_origin = point + direction * 1e-3;
            let bounce_ray = Ray::new(bounce_origin, direction, 1e-3, f64::INFINITY);
            get_color_pathtrace(scene, &bounce_ray, depth + 1, max_depth, rng)
        }
    };

    emitted + scattered
}
