use crate::aabb::Aabb;
use crate::triangle::Triangle;
use crate::vec3::Point3;

/// A named set of triangles with a tight AABB over its faces, as produced
/// by the OBJ loader (one `Mesh` per `o`/`g` group, §6).
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub faces: Vec<Triangle>,
    pub bbox_min: Point3,
    pub bbox_max: Point3,
}

impl Mesh {
    pub fn new(name: String, faces: Vec<Triangle>) -> Self {
        let (bbox_min, bbox_max) = Self::compute_bbox(&faces);
        Self {
            name,
            faces,
            bbox_min,
            bbox_max,
        }
    }

    fn compute_bbox(faces: &[Triangle]) -> (Point3, Point3) {
        if faces.is_empty() {
            return (Point3::zero(), Point3::zero());
        }
        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for face in faces {
            let bb = face.bounding_box();
            min = Point3::new(min.x.min(bb.min.x), min.y.min(bb.min.y), min.z.min(bb.min.z));
            max = Point3::new(max.x.max(bb.max.x), max.y.max(bb.max.y), max.z.max(bb.max.z));
        }
        (min, max)
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::new(self.bbox_min, self.bbox_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use std::sync::Arc;

    #[test]
    fn bbox_encloses_all_faces() {
        let mat = Arc::new(Material::default());
        let faces = vec![
            Triangle::new(
                Point3::new(-1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
                mat.clone(),
            ),
            Triangle::new(
                Point3::new(-3.0, -1.0, 0.0),
                Point3::new(0.0, -1.0, 0.0),
                Point3::new(-1.0, -2.0, 0.0),
                mat,
            ),
        ];
        let mesh = Mesh::new("test".to_string(), faces);
        assert_eq!(mesh.bbox_min, Point3::new(-3.0, -2.0, 0.0));
        assert_eq!(mesh.bbox_max, Point3::new(1.0, 2.0, 0.0));
    }
}
