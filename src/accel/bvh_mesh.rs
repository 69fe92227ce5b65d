use crate::aabb::Aabb;
use crate::hit::{closer_of, Hit};
use crate::mesh::Mesh;
use crate::ray::Ray;

pub const DEFAULT_MAX_LEAF_SIZE: usize = 1;

/// A BVH over whole meshes rather than individual triangles. At a leaf,
/// each mesh's own AABB is re-tested before its triangles are brute-forced,
/// preserving per-mesh locality and AABB reuse (§4.4).
pub enum MeshBvhNode {
    Leaf { meshes: Vec<Mesh>, bbox: Aabb },
    Interior {
        left: Box<MeshBvhNode>,
        right: Box<MeshBvhNode>,
        bbox: Aabb,
    },
}

impl MeshBvhNode {
    pub fn build(meshes: Vec<Mesh>) -> Self {
        if meshes.is_empty() {
            return MeshBvhNode::Leaf {
                meshes,
                bbox: Aabb::new(crate::vec3::Point3::zero(), crate::vec3::Point3::zero()),
            };
        }

        let bbox = enclosing_bbox(&meshes);
        if meshes.len() <= DEFAULT_MAX_LEAF_SIZE {
            return MeshBvhNode::Leaf { meshes, bbox };
        }

        let axis = bbox.longest_axis();
        let mut meshes = meshes;
        meshes.sort_by(|a, b| {
            mesh_centroid(a, axis)
                .partial_cmp(&mesh_centroid(b, axis))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = meshes.len() / 2;
        let right_half = meshes.split_off(mid);
        let left = Box::new(Self::build(meshes));
        let right = Box::new(Self::build(right_half));
        MeshBvhNode::Interior { left, right, bbox }
    }

    pub fn bbox(&self) -> Aabb {
        match self {
            MeshBvhNode::Leaf { bbox, .. } => *bbox,
            MeshBvhNode::Interior { bbox, .. } => *bbox,
        }
    }

    pub fn hit<'a>(&'a self, ray: &Ray) -> Option<Hit<'a>> {
        if !self.bbox().hit(ray) {
            return None;
        }
        match self {
            MeshBvhNode::Leaf { meshes, .. } => {
                let mut best: Option<Hit<'a>> = None;
                for mesh in meshes {
                    if !mesh.bounding_box().hit(ray) {
                        continue;
                    }
                    for tri in &mesh.faces {
                        if let Some((t, point)) = tri.hit(ray) {
                            let candidate = Hit::new(t, point, tri);
                            best = Some(match best {
                                Some(b) => b.closer(Some(candidate)),
                                None => candidate,
                            });
                        }
                    }
                }
                best
            }
            MeshBvhNode::Interior { left, right, .. } => {
                closer_of(left.hit(ray), right.hit(ray))
            }
        }
    }
}

fn mesh_centroid(mesh: &Mesh, axis: usize) -> f64 {
    (mesh.bbox_min[axis] + mesh.bbox_max[axis]) * 0.5
}

fn enclosing_bbox(meshes: &[Mesh]) -> Aabb {
    meshes
        .iter()
        .map(Mesh::bounding_box)
        .reduce(|a, b| Aabb::surrounding(&a, &b))
        .expect("enclosing_bbox called on an empty mesh list")
}
