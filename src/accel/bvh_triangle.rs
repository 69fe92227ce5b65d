use crate::aabb::Aabb;
use crate::hit::{closer_of, Hit};
use crate::ray::Ray;
use crate::triangle::Triangle;

pub const DEFAULT_MAX_LEAF_SIZE: usize = 4;

/// A bounding volume hierarchy over triangles. Built top-down with a
/// median split on the widest axis (§4.3); both children are always
/// visited once the node's box passes — there is no front/back ordering,
/// unlike the KD-tree.
pub enum TriangleBvhNode {
    Leaf {
        triangles: Vec<Triangle>,
        bbox: Aabb,
    },
    Interior {
        left: Box<TriangleBvhNode>,
        right: Box<TriangleBvhNode>,
        bbox: Aabb,
    },
}

impl TriangleBvhNode {
    pub fn build(triangles: Vec<Triangle>) -> Self {
        Self::build_with_leaf_size(triangles, DEFAULT_MAX_LEAF_SIZE)
    }

    pub fn build_with_leaf_size(triangles: Vec<Triangle>, max_leaf_size: usize) -> Self {
        if triangles.is_empty() {
            // An empty scene builds a benign always-miss leaf (§7 item 2).
            return TriangleBvhNode::Leaf {
                triangles,
                bbox: Aabb::new(crate::vec3::Point3::zero(), crate::vec3::Point3::zero()),
            };
        }

        let bbox = enclosing_bbox(&triangles);
        if triangles.len() <= max_leaf_size {
            return TriangleBvhNode::Leaf { triangles, bbox };
        }

        let axis = bbox.longest_axis();
        let mut triangles = triangles;
        // Stable sort: centroid ties keep their incoming relative order.
        triangles.sort_by(|a, b| {
            a.centroid(axis)
                .partial_cmp(&b.centroid(axis))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = triangles.len() / 2;
        let right_half = triangles.split_off(mid);
        let left = Box::new(Self::build_with_leaf_size(triangles, max_leaf_size));
        let right = Box::new(Self::build_with_leaf_size(right_half, max_leaf_size));
        TriangleBvhNode::Interior { left, right, bbox }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            TriangleBvhNode::Leaf { bbox, .. } => *bbox,
            TriangleBvhNode::Interior { bbox, .. } => *bbox,
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray) -> Option<Hit<'a>> {
        if !self.bbox().hit(ray) {
            return None;
        }
        match self {
            TriangleBvhNode::Leaf { triangles, .. } => {
                let mut best: Option<Hit<'a>> = None;
                for tri in triangles {
                    if let Some((t, point)) = tri.hit(ray) {
                        let candidate = Hit::new(t, point, tri);
                        best = Some(match best {
                            Some(b) => b.closer(Some(candidate)),
                            None => candidate,
                        });
                    }
                }
                best
            }
            TriangleBvhNode::Interior { left, right, .. } => {
                let hit_left = left.hit(ray);
                let hit_right = right.hit(ray);
                closer_of(hit_left, hit_right)
            }
        }
    }
}

fn enclosing_bbox(triangles: &[Triangle]) -> Aabb {
    triangles
        .iter()
        .map(Triangle::bounding_box)
        .reduce(|a, b| Aabb::surrounding(&a, &b))
        .expect("enclosing_bbox called on an empty triangle list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::vec3::{Point3, Vec3};
    use std::sync::Arc;

    fn grid_of_triangles(n: i32) -> Vec<Triangle> {
        let mat = Arc::new(Material::default());
        let mut tris = Vec::new();
        for i in -n..n {
            for j in -n..n {
                let x = i as f64 * 3.0;
                let z = j as f64 * 3.0;
                tris.push(Triangle::new(
                    Point3::new(x - 0.5, -0.5, z),
                    Point3::new(x + 0.5, -0.5, z),
                    Point3::new(x, 0.5, z),
                    mat.clone(),
                ));
            }
        }
        tris
    }

    fn brute_force<'a>(triangles: &'a [Triangle], ray: &Ray) -> Option<Hit<'a>> {
        let mut best: Option<Hit<'a>> = None;
        for tri in triangles {
            if let Some((t, point)) = tri.hit(ray) {
                let candidate = Hit::new(t, point, tri);
                best = Some(match best {
                    Some(b) => b.closer(Some(candidate)),
                    None => candidate,
                });
            }
        }
        best
    }

    #[test]
    fn bvh_matches_brute_force_over_random_rays() {
        let triangles = grid_of_triangles(4);
        let bvh = TriangleBvhNode::build(triangles.clone());

        let mut state = 88172645463325252u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) * 2.0 - 1.0
        };

        for _ in 0..500 {
            let origin = Point3::new(next() * 15.0, next() * 5.0, next() * 15.0 - 5.0);
            let dir = Vec3::new(next(), next(), next() - 0.2);
            let ray = Ray::primary(origin, dir);

            let expected = brute_force(&triangles, &ray);
            let actual = bvh.hit(&ray);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => assert!((e.t - a.t).abs() < 1e-9),
                (e, a) => panic!("mismatch: expected {:?}, got {:?}", e.map(|h| h.t), a.map(|h| h.t)),
            }
        }
    }

    #[test]
    fn empty_scene_always_misses() {
        let bvh = TriangleBvhNode::build(Vec::new());
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(bvh.hit(&ray).is_none());
    }

    #[test]
    fn node_bbox_encloses_all_leaves() {
        let triangles = grid_of_triangles(3);
        let bvh = TriangleBvhNode::build(triangles.clone());
        let bbox = bvh.bbox();
        for tri in &triangles {
            let tb = tri.bounding_box();
            assert!(bbox.min.x <= tb.min.x && tb.max.x <= bbox.max.x);
            assert!(bbox.min.y <= tb.min.y && tb.max.y <= bbox.max.y);
            assert!(bbox.min.z <= tb.min.z && tb.max.z <= bbox.max.z);
        }
    }
}
