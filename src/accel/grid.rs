use std::collections::HashMap;

use crate::aabb::Aabb;
use crate::hit::{closer_of, Hit};
use crate::ray::Ray;
use crate::triangle::Triangle;
use crate::vec3::Point3;

/// Desired average triangles-per-cell target used to pick the grid
/// resolution from the scene's bounding box extents (§4.6).
const DESIRED_RESOLUTION: f64 = 20.0;
const PADDING: f64 = 1e-3;

type CellKey = (i32, i32, i32);

/// A uniform spatial grid traversed with the Amanatides-Woo 3-D DDA
/// algorithm. Cell resolution is adaptive: it scales with the scene's
/// longest bbox axis so that cells stay roughly cubical (§4.6).
pub struct UniformGrid {
    bbox_min: Point3,
    bbox_max: Point3,
    resolution: (i32, i32, i32),
    cell_size: Point3,
    inv_cell_size: Point3,
    cells: HashMap<CellKey, Vec<Triangle>>,
}

impl UniformGrid {
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let (bbox_min, bbox_max) = enclosing_bbox(&triangles);
        let bbox_min = bbox_min - Point3::new(PADDING, PADDING, PADDING);
        let bbox_max = bbox_max + Point3::new(PADDING, PADDING, PADDING);
        let extent = bbox_max - bbox_min;

        let max_extent = extent.x.max(extent.y).max(extent.z).max(PADDING);
        let resolution = (
            ((extent.x / max_extent) * DESIRED_RESOLUTION).floor().max(1.0) as i32,
            ((extent.y / max_extent) * DESIRED_RESOLUTION).floor().max(1.0) as i32,
            ((extent.z / max_extent) * DESIRED_RESOLUTION).floor().max(1.0) as i32,
        );

        let cell_size = Point3::new(
            extent.x / resolution.0 as f64,
            extent.y / resolution.1 as f64,
            extent.z / resolution.2 as f64,
        );
        let inv_cell_size = Point3::new(1.0 / cell_size.x, 1.0 / cell_size.y, 1.0 / cell_size.z);

        let mut cells: HashMap<CellKey, Vec<Triangle>> = HashMap::new();
        for tri in triangles {
            let bb = tri.bounding_box();
            let lo = point_to_cell(bb.min, bbox_min, inv_cell_size, resolution);
            let hi = point_to_cell(bb.max, bbox_min, inv_cell_size, resolution);
            for ix in lo.0..=hi.0 {
                for iy in lo.1..=hi.1 {
                    for iz in lo.2..=hi.2 {
                        cells.entry((ix, iy, iz)).or_default().push(tri.clone());
                    }
                }
            }
        }

        Self {
            bbox_min,
            bbox_max,
            resolution,
            cell_size,
            inv_cell_size,
            cells,
        }
    }

    fn bbox(&self) -> Aabb {
        Aabb::new(self.bbox_min, self.bbox_max)
    }

    /// Amanatides-Woo traversal: step cell-by-cell along the ray, testing
    /// every triangle registered in each cell visited, stopping as soon as a
    /// cell yields a hit (any triangle straddling a later cell boundary is
    /// already duplicated into the current cell, so the first cell with a
    /// hit holds the true closest one).
    pub fn hit<'a>(&'a self, ray: &Ray) -> Option<Hit<'a>> {
        let (mut t_enter, t_leave) = match self.bbox().hit_entry_exit(ray) {
            Some(bounds) => bounds,
            None => return None,
        };
        t_enter = t_enter.max(ray.t_min);
        if t_enter >= t_leave {
            return None;
        }

        let entry_point = ray.point_at(t_enter);
        let mut cell = point_to_cell(entry_point, self.bbox_min, self.inv_cell_size, self.resolution);

        let step = (
            step_dir(ray.direction.x),
            step_dir(ray.direction.y),
            step_dir(ray.direction.z),
        );

        let (mut t_max_x, dt_x) = compute_t_and_dt(
            ray.origin.x,
            ray.direction.x,
            self.bbox_min.x,
            self.cell_size.x,
            cell.0,
            step.0,
        );
        let (mut t_max_y, dt_y) = compute_t_and_dt(
            ray.origin.y,
            ray.direction.y,
            self.bbox_min.y,
            self.cell_size.y,
            cell.1,
            step.1,
        );
        let (mut t_max_z, dt_z) = compute_t_and_dt(
            ray.origin.z,
            ray.direction.z,
            self.bbox_min.z,
            self.cell_size.z,
            cell.2,
            step.2,
        );

        // Warm up: the entry point may sit a little before the first cell
        // boundary due to the padding offset; advance until each t_max is
        // at least at the entry parameter.
        while t_max_x < t_enter {
            t_max_x += dt_x;
        }
        while t_max_y < t_enter {
            t_max_y += dt_y;
        }
        while t_max_z < t_enter {
            t_max_z += dt_z;
        }

        loop {
            if cell.0 < 0
                || cell.0 >= self.resolution.0
                || cell.1 < 0
                || cell.1 >= self.resolution.1
                || cell.2 < 0
                || cell.2 >= self.resolution.2
            {
                return None;
            }

            if let Some(triangles) = self.cells.get(&cell) {
                let mut best: Option<Hit<'a>> = None;
                for tri in triangles {
                    if let Some((t, point)) = tri.hit(ray) {
                        let candidate = Hit::new(t, point, tri);
                        best = Some(closer_of(best, Some(candidate)).unwrap());
                    }
                }
                if best.is_some() {
                    return best;
                }
            }

            if t_max_x < t_max_y && t_max_x < t_max_z {
                if t_max_x > t_leave {
                    return None;
                }
                cell.0 += step.0;
                t_max_x += dt_x;
            } else if t_max_y < t_max_z {
                if t_max_y > t_leave {
                    return None;
                }
                cell.1 += step.1;
                t_max_y += dt_y;
            } else {
                if t_max_z > t_leave {
                    return None;
                }
                cell.2 += step.2;
                t_max_z += dt_z;
            }
        }
    }
}

fn step_dir(d: f64) -> i32 {
    if d >= 0.0 {
        1
    } else {
        -1
    }
}

/// Amanatides-Woo's `tMax`/`tDelta` for one axis: the parametric distance to
/// the next cell boundary, and the parametric width of one cell along the
/// ray.
fn compute_t_and_dt(origin: f64, dir: f64, bbox_min: f64, cell_size: f64, cell: i32, step: i32) -> (f64, f64) {
    if dir.abs() < 1e-9 {
        return (f64::INFINITY, f64::INFINITY);
    }
    let next_boundary = bbox_min + (cell + if step > 0 { 1 } else { 0 }) as f64 * cell_size;
    let t_max = (next_boundary - origin) / dir;
    let dt = (cell_size / dir).abs();
    (t_max, dt)
}

fn point_to_cell(p: Point3, bbox_min: Point3, inv_cell_size: Point3, resolution: (i32, i32, i32)) -> CellKey {
    let ix = (((p.x - bbox_min.x) * inv_cell_size.x) as i32).clamp(0, resolution.0 - 1);
    let iy = (((p.y - bbox_min.y) * inv_cell_size.y) as i32).clamp(0, resolution.1 - 1);
    let iz = (((p.z - bbox_min.z) * inv_cell_size.z) as i32).clamp(0, resolution.2 - 1);
    (ix, iy, iz)
}

fn enclosing_bbox(triangles: &[Triangle]) -> (Point3, Point3) {
    if triangles.is_empty() {
        return (Point3::zero(), Point3::zero());
    }
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for tri in triangles {
        let bb = tri.bounding_box();
        min = Point3::new(min.x.min(bb.min.x), min.y.min(bb.min.y), min.z.min(bb.min.z));
        max = Point3::new(max.x.max(bb.max.x), max.y.max(bb.max.y), max.z.max(bb.max.z));
    }
    (min, max)
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
                best = Some(closer_of(best, Some(candidate)).unwrap());
            }
        }
        best
    }

    #[test]
    fn grid_matches_brute_force_over_random_rays() {
        let triangles = grid_of_triangles(4);
        let grid = UniformGrid::build(triangles.clone());

        let mut state = 362436069u64;
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
            let actual = grid.hit(&ray);
            match (expected, actual) {
                (None, None) => {}
                (Some(e), Some(a)) => assert!((e.t - a.t).abs() < 1e-6),
                (e, a) => panic!("mismatch: expected {:?}, got {:?}", e.map(|h| h.t), a.map(|h| h.t)),
            }
        }
    }

    #[test]
    fn empty_grid_always_misses() {
        let grid = UniformGrid::build(Vec::new());
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(grid.hit(&ray).is_none());
    }

    #[test]
    fn single_cell_grid_still_hits() {
        let mat = Arc::new(Material::default());
        let tri = Triangle::new(
            Point3::new(-1.0, -1.0, -5.0),
            Point3::new(1.0, -1.0, -5.0),
            Point3::new(0.0, 1.0, -5.0),
            mat,
        );
        let grid = UniformGrid::build(vec![tri]);
        let ray = Ray::primary(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        assert!(grid.hit(&ray).is_some());
    }
}
