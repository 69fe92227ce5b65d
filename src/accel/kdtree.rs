use crate::aabb::Aabb;
use crate::hit::Hit;
use crate::ray::Ray;
use crate::triangle::Triangle;
use crate::vec3::Point3;

/// Default max depth for [`KdTreeNode::build`] (§4.5).
pub const DEFAULT_MAX_DEPTH: i32 = 16;

const SPLIT_EPSILON: f64 = 1e-9;

/// An object-median KD-tree. Triangles straddling the split plane are
/// duplicated into both children (spatial, not strict, classification),
/// and traversal orders children with the Ingo-Wald `t_enter`/`t_leave`/
/// `t_split` relations rather than a simple near/far box test (§4.5).
pub enum KdTreeNode {
    Leaf {
        triangles: Vec<Triangle>,
        bbox: Aabb,
    },
    Internal {
        axis: usize,
        split: f64,
        left: Box<KdTreeNode>,
        right: Box<KdTreeNode>,
        bbox: Aabb,
    },
}

impl KdTreeNode {
    pub fn build(triangles: Vec<Triangle>) -> Self {
        Self::build_with_max_depth(triangles, DEFAULT_MAX_DEPTH)
    }

    pub fn build_with_max_depth(triangles: Vec<Triangle>, max_depth: i32) -> Self {
        let bbox = enclosing_bbox(&triangles);
        Self::build_node(triangles, bbox, 0, max_depth)
    }

    fn build_node(triangles: Vec<Triangle>, bbox: Aabb, depth: i32, max_depth: i32) -> Self {
        if triangles.len() <= 1 || depth >= max_depth {
            return KdTreeNode::Leaf { triangles, bbox };
        }

        let axis = bbox.longest_axis();
        let median = statistical_median(&triangles, axis);

        let mut left_bbox = bbox;
        left_bbox.max = set_axis(left_bbox.max, axis, median);
        let mut right_bbox = bbox;
        right_bbox.min = set_axis(right_bbox.min, axis, median);

        let mut left = Vec::new();
        let mut right = Vec::new();
        for tri in &triangles {
            let (lo, hi) = tri_axis_extent(tri, axis);
            if lo <= median {
                left.push(tri.clone());
            }
            if hi >= median {
                right.push(tri.clone());
            }
        }

        // Degenerate median (every triangle straddles, or all fall on one
        // side) would otherwise recurse forever on an identical triangle
        // set; fall back to a leaf instead.
        if left.len() == triangles.len() || right.len() == triangles.len() {
            return KdTreeNode::Leaf { triangles, bbox };
        }

        let left = Box::new(Self::build_node(left, left_bbox, depth + 1, max_depth));
        let right = Box::new(Self::build_node(right, right_bbox, depth + 1, max_depth));
        KdTreeNode::Internal {
            axis,
            split: median,
            left,
            right,
            bbox,
        }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            KdTreeNode::Leaf { bbox, .. } => *bbox,
            KdTreeNode::Internal { bbox, .. } => *bbox,
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray) -> Option<Hit<'a>> {
        if !self.bbox().hit(ray) {
            return None;
        }
        match self {
            KdTreeNode::Leaf { triangles, .. } => {
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
            KdTreeNode::Internal {
                axis,
                split,
                left,
                right,
                bbox,
            } => self.traverse_ordered(ray, *axis, *split, left, right, bbox),
        }
    }

    /// Ingo-Wald ordered traversal: compute `t_enter`, `t_leave` against this
    /// node's box and `t_split` against the split plane, all on the split
    /// axis only — the other two axes never enter this comparison, which is
    /// intentional (§9 open question 5).
    #[allow(clippy::too_many_arguments)]
    fn traverse_ordered<'a>(
        &'a self,
        ray: &Ray,
        axis: usize,
        split: f64,
        left: &'a KdTreeNode,
        right: &'a KdTreeNode,
        bbox: &Aabb,
    ) -> Option<Hit<'a>> {
        let dir = ray.direction[axis];
        let inv_d = if dir.abs() < SPLIT_EPSILON {
            1.0 / SPLIT_EPSILON.copysign(dir)
        } else {
            1.0 / dir
        };

        // Deliberately not min/max-ordered: whether t_enter or t_leave comes
        // first along this axis tells us whether the ray crosses the box
        // min-side-first or max-side-first, and that sign is what picks
        // between the two branches below (§9 open question 5). Swapping them
        // here would throw that information away.
        let t_enter = (bbox.min[axis] - ray.origin[axis]) * inv_d;
        let t_leave = (bbox.max[axis] - ray.origin[axis]) * inv_d;
        let t_split = (split - ray.origin[axis]) * inv_d;

        if t_enter <= t_leave {
            // Ray's near side of the box is the min side along this axis.
            if t_split <= t_enter {
                right.hit(ray)
            } else if t_split >= t_leave {
                left.hit(ray)
            } else {
                left.hit(ray).or_else(|| right.hit(ray))
            }
        } else if t_split <= t_leave {
            left.hit(ray)
        } else if t_split >= t_enter {
            right.hit(ray)
        } else {
            right.hit(ray).or_else(|| left.hit(ray))
        }
    }
}

fn set_axis(mut p: Point3, axis: usize, value: f64) -> Point3 {
    match axis {
        0 => p.x = value,
        1 => p.y = value,
        _ => p.z = value,
    }
    p
}

fn tri_axis_extent(tri: &Triangle, axis: usize) -> (f64, f64) {
    let coords = [tri.v0[axis], tri.v1[axis], tri.v2[axis]];
    (
        coords.iter().cloned().fold(f64::INFINITY, f64::min),
        coords.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    )
}

fn statistical_median(triangles: &[Triangle], axis: usize) -> f64 {
    let mut coords: Vec<f64> = triangles
        .iter()
        .flat_map(|t| [t.v0[axis], t.v1[axis], t.v2[axis]])
        .collect();
    coords.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = coords.len();
    if n % 2 == 1 {
        coords[n / 2]
    } else {
        (coords[n / 2 - 1] + coords[n / 2]) / 2.0
    }
}

fn enclosing_bbox(triangles: &[Triangle]) -> Aabb {
    triangles
        .iter()
        .map(Triangle::bounding_box)
        .reduce(|a, b| Aabb::surrounding(&a, &b))
        .unwrap_or_else(|| Aabb::new(Point3::zero(), Point3::zero()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::vec3::Vec3;
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
    fn kdtree_matches_brute_force_over_random_rays() {
        let triangles = grid_of_triangles(4);
        let tree = KdTreeNode::build(triangles.clone());

        let mut state = 2463534242u64;
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
            let actual = tree.hit(&ray);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => assert!((e.t - a.t).abs() < 1e-6),
                (e, a) => panic!("mismatch: expected {:?}, got {:?}", e.map(|h| h.t), a.map(|h| h.t)),
            }
        }
    }

    /// Regression test for the ordered-traversal branch that only runs when
    /// a ray crosses its split axis max-side-first (negative direction
    /// component) — the swap bug this guards against made that branch dead
    /// code.
    #[test]
    fn kdtree_matches_brute_force_for_negative_direction_rays() {
        let triangles = grid_of_triangles(4);
        let tree = KdTreeNode::build(triangles.clone());

        let mut state = 88172645463325252u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state as f64 / u64::MAX as f64) * 2.0 - 1.0
        };

        for _ in 0..500 {
            let origin = Point3::new(next() * 15.0, next() * 5.0, next() * 15.0 - 5.0);
            // All three direction components negative, guaranteeing the
            // traversal crosses the max side of the split axis first.
            let dir = Vec3::new(-next().abs() - 0.1, -next().abs() - 0.1, -next().abs() - 0.1);
            let ray = Ray::primary(origin, dir);

            let expected = brute_force(&triangles, &ray);
            let actual = tree.hit(&ray);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => assert!((e.t - a.t).abs() < 1e-6),
                (e, a) => panic!("mismatch: expected {:?}, got {:?}", e.map(|h| h.t), a.map(|h| h.t)),
            }
        }
    }

    #[test]
    fn empty_tree_always_misses() {
        let tree = KdTreeNode::build(Vec::new());
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(tree.hit(&ray).is_none());
    }

    #[test]
    fn single_triangle_is_a_leaf_and_still_hits() {
        let mat = Arc::new(Material::default());
        let tri = Triangle::new(
            Point3::new(-1.0, -1.0, -5.0),
            Point3::new(1.0, -1.0, -5.0),
            Point3::new(0.0, 1.0, -5.0),
            mat,
        );
        let tree = KdTreeNode::build(vec![tri]);
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(tree.hit(&ray).is_some());
    }
}
