use crate::accel::{AccelerationChoice, Accelerator};
use crate::hit::Hit;
use crate::light::Light;
use crate::mesh::Mesh;
use crate::ray::Ray;

/// A loaded scene: the mesh geometry, the chosen acceleration structure
/// built over it, and the lighting environment (§4.7, §6).
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub accelerator: Accelerator,
    pub lights: Vec<Light>,
    pub ambient_light: f64,
}

impl Scene {
    pub fn build(
        meshes: Vec<Mesh>,
        accel_choice: AccelerationChoice,
        lights: Vec<Light>,
        ambient_light: f64,
    ) -> Self {
        let accelerator = Accelerator::build(accel_choice, &meshes);
        Self {
            meshes,
            accelerator,
            lights,
            ambient_light,
        }
    }

    /// Dispatches to whichever accelerator this scene was built with. Every
    /// variant returns the closest intersection within `ray.t_min..=ray.t_max`
    /// (§4.7).
    pub fn hit(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.accelerator.hit(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::triangle::Triangle;
    use crate::vec3::{Point3, Vec3};
    use std::sync::Arc;

    fn single_triangle_scene(choice: AccelerationChoice) -> Scene {
        let mat = Arc::new(Material::default());
        let tri = Triangle::new(
            Point3::new(-1.0, -1.0, -5.0),
            Point3::new(1.0, -1.0, -5.0),
            Point3::new(0.0, 1.0, -5.0),
            mat,
        );
        let mesh = Mesh::new("tri".to_string(), vec![tri]);
        Scene::build(vec![mesh], choice, Vec::new(), 0.1)
    }

    #[test]
    fn every_accelerator_agrees_on_a_simple_hit() {
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        for choice in [
            AccelerationChoice::Bvh,
            AccelerationChoice::MeshBvh,
            AccelerationChoice::KdTree,
            AccelerationChoice::Grid,
            AccelerationChoice::None,
        ] {
            let scene = single_triangle_scene(choice);
            let hit = scene.hit(&ray);
            assert!(hit.is_some(), "{choice:?} missed an obvious hit");
        }
    }

    #[test]
    fn empty_scene_misses_for_every_accelerator() {
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        for choice in [
            AccelerationChoice::Bvh,
            AccelerationChoice::MeshBvh,
            AccelerationChoice::KdTree,
            AccelerationChoice::Grid,
            AccelerationChoice::None,
        ] {
            let scene = Scene::build(Vec::new(), choice, Vec::new(), 0.1);
            assert!(scene.hit(&ray).is_none());
        }
    }
}
