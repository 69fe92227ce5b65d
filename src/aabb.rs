use crate::ray::Ray;
use crate::vec3::Point3;

/// An axis-aligned bounding box. Used as the bounding volume for every
/// acceleration structure (BVH leaves/nodes, KD-tree node boxes, the
/// uniform grid's overall extent).
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

/// Below this magnitude a direction component is treated as ε-clamped to
/// `±1e-8` rather than triggering a parallel-ray special case (§4.2).
const DIR_EPSILON: f64 = 1e-8;

#[inline(always)]
fn clamp_dir_component(d: f64) -> f64 {
    if d.abs() < DIR_EPSILON {
        if d.is_sign_negative() {
            -DIR_EPSILON
        } else {
            DIR_EPSILON
        }
    } else {
        d
    }
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Does `ray` intersect the box within `[ray.t_min, ray.t_max]`? Uses
    /// the branchless running min/max slab test; fails when `tmax <= tmin`,
    /// including the exact-equality grazing case (§8 boundary behaviours).
    pub fn hit(&self, ray: &Ray) -> bool {
        let mut tmin = ray.t_min;
        let mut tmax = ray.t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / clamp_dir_component(ray.direction[axis]);
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = t0.max(tmin);
            tmax = t1.min(tmax);
            if tmax <= tmin {
                return false;
            }
        }
        true
    }

    /// Entry/exit parametric interval against the box, independent of the
    /// ray's own `t_min`/`t_max` seed — used by the grid DDA traversal to
    /// find where the ray first enters the grid's overall bounding box,
    /// since `hit` only answers "yes/no" (§4.2 edge case note).
    pub fn hit_entry_exit(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut tmin = ray.t_min;
        let mut tmax = ray.t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / clamp_dir_component(ray.direction[axis]);
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            tmin = t0.max(tmin);
            tmax = t1.min(tmax);
            if tmax <= tmin {
                return None;
            }
        }
        Some((tmin, tmax))
    }

    /// The union of two AABBs — used while building a BVH to find the
    /// bounding volume over a set of children.
    pub fn surrounding(a: &Aabb, b: &Aabb) -> Aabb {
        let min = Point3::new(
            a.min.x.min(b.min.x),
            a.min.y.min(b.min.y),
            a.min.z.min(b.min.z),
        );
        let max = Point3::new(
            a.max.x.max(b.max.x),
            a.max.y.max(b.max.y),
            a.max.z.max(b.max.z),
        );
        Aabb::new(min, max)
    }

    /// Index of the longest axis (0=x, 1=y, 2=z). Ties favor the lowest
    /// axis index, matching the BVH/KD-tree split-axis tie-break rule.
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3::Vec3;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn ray_through_center_hits() {
        let b = unit_box();
        let r = Ray::primary(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&r));
    }

    #[test]
    fn ray_missing_box_misses() {
        let b = unit_box();
        let r = Ray::primary(Point3::new(5.0, 5.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&r));
    }

    #[test]
    fn grazing_edge_counts_as_miss() {
        // A ray parallel to an axis whose origin lies exactly on a face
        // produces tmax == tmin on that axis, which must be a miss.
        let b = unit_box();
        let r = Ray::new(
            Point3::new(1.0, 1.0, -5.0),
            Vec3::new(0.0, 0.0, 1.0),
            1.0,
            1.0,
        );
        assert!(!b.hit(&r));
    }

    #[test]
    fn entry_exit_matches_hit_bool() {
        let b = unit_box();
        let r = Ray::primary(Point3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        let (t_enter, t_exit) = b.hit_entry_exit(&r).unwrap();
        assert!(t_enter < t_exit);
        assert!(b.hit(&r));
    }

    #[test]
    fn longest_axis_breaks_ties_low() {
        let b = Aabb::new(Point3::zero(), Point3::new(2.0, 2.0, 1.0));
        assert_eq!(b.longest_axis(), 0);
    }
}
