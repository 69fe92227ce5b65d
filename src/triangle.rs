use std::sync::Arc;

use crate::aabb::Aabb;
use crate::material::Material;
use crate::ray::Ray;
use crate::vec3::Point3;

const EPSILON: f64 = 1e-8;

/// A single triangular face. `unit_norm` is precomputed at construction so
/// every intersection and every shading call reuses it instead of
/// recomputing `normalize(cross(e1, e2))` per ray.
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub unit_norm: Point3,
    pub material: Arc<Material>,
}

impl Triangle {
    /// Builds a triangle, computing its unit normal. Panics if the three
    /// vertices are colinear (zero-area normal) — the loader is the place
    /// that should reject degenerate faces before they reach here (§7 item 1).
    pub fn new(v0: Point3, v1: Point3, v2: Point3, material: Arc<Material>) -> Self {
        let raw_norm = (v1 - v0).cross(v2 - v0);
        assert!(
            raw_norm.length() > 1e-12,
            "degenerate triangle: colinear vertices"
        );
        Self {
            v0,
            v1,
            v2,
            unit_norm: raw_norm.normalized(),
            material,
        }
    }

    /// Möller–Trumbore intersection. Returns the raw `(t, point)` pair
    /// un-clamped against `ray.t_min`/`ray.t_max` — callers (the
    /// acceleration structures) are responsible for that clamp (§4.1).
    pub fn intersect_raw(&self, ray: &Ray) -> Option<(f64, Point3)> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        if t > EPSILON {
            Some((t, ray.point_at(t)))
        } else {
            None
        }
    }

    /// Intersection clamped to the ray's own `[t_min, t_max]` interval —
    /// the convenience most accelerators actually want.
    pub fn hit(&self, ray: &Ray) -> Option<(f64, Point3)> {
        let (t, point) = self.intersect_raw(ray)?;
        if ray.t_min <= t && t <= ray.t_max {
            Some((t, point))
        } else {
            None
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        let min = Point3::new(
            self.v0.x.min(self.v1.x).min(self.v2.x),
            self.v0.y.min(self.v1.y).min(self.v2.y),
            self.v0.z.min(self.v1.z).min(self.v2.z),
        );
        let max = Point3::new(
            self.v0.x.max(self.v1.x).max(self.v2.x),
            self.v0.y.max(self.v1.y).max(self.v2.y),
            self.v0.z.max(self.v1.z).max(self.v2.z),
        );
        Aabb::new(min, max)
    }

    pub fn centroid(&self, axis: usize) -> f64 {
        (self.v0[axis] + self.v1[axis] + self.v2[axis]) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Vec3;

    fn tri() -> Triangle {
        Triangle::new(
            Point3::new(-1.0, -1.0, -5.0),
            Point3::new(1.0, -1.0, -5.0),
            Point3::new(0.0, 1.0, -5.0),
            Arc::new(Material::default()),
        )
    }

    #[test]
    fn center_ray_hits() {
        let t = tri();
        let r = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let hit = t.hit(&r);
        assert!(hit.is_some());
        assert!(hit.unwrap().0 > EPSILON);
    }

    #[test]
    fn ray_outside_triangle_in_plane_misses() {
        let t = tri();
        // Points toward the triangle's plane but well outside its edges.
        let r = Ray::primary(Point3::new(10.0, 10.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(t.hit(&r).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let t = tri();
        let r = Ray::primary(Point3::new(0.0, 0.0, -5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(t.hit(&r).is_none());
    }

    #[test]
    fn bounding_box_encloses_vertices() {
        let t = tri();
        let bb = t.bounding_box();
        for v in [t.v0, t.v1, t.v2] {
            assert!(bb.min.x <= v.x && v.x <= bb.max.x);
            assert!(bb.min.y <= v.y && v.y <= bb.max.y);
            assert!(bb.min.z <= v.z && v.z <= bb.max.z);
        }
    }
}
