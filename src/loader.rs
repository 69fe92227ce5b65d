use std::path::Path;
use std::sync::Arc;

use crate::error::SceneError;
use crate::material::{IlluminationModel, Material};
use crate::mesh::Mesh;
use crate::triangle::Triangle;
use crate::vec3::{Color, Point3};

/// Loads an OBJ file (and its companion MTL) into one [`Mesh`] per `tobj`
/// model, splitting each model's index buffer into Möller–Trumbore
/// triangles and sharing one [`Material`] per face group via `Arc` (§6,
/// §9 "Shared immutable accelerators across threads").
pub fn load_obj(path: &Path) -> Result<Vec<Mesh>, SceneError> {
    let load_options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
    };

    let (models, materials_result) =
        tobj::load_obj(path, &load_options).map_err(|e| SceneError::ObjParse(e.to_string()))?;
    let materials = materials_result.map_err(|e| SceneError::ObjParse(e.to_string()))?;

    let resolved: Vec<Arc<Material>> = materials.iter().map(|m| Arc::new(convert_material(m))).collect();
    let default_material = Arc::new(Material::default());

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let mesh_data = model.mesh;
        let material = match mesh_data.material_id {
            Some(id) => resolved
                .get(id)
                .cloned()
                .ok_or(SceneError::MissingMaterial(model.name.clone()))?,
            None => default_material.clone(),
        };

        let mut faces = Vec::with_capacity(mesh_data.indices.len() / 3);
        for tri_indices in mesh_data.indices.chunks_exact(3) {
            let [a, b, c] = [tri_indices[0], tri_indices[1], tri_indices[2]];
            let v0 = vertex_at(&mesh_data.positions, a);
            let v1 = vertex_at(&mesh_data.positions, b);
            let v2 = vertex_at(&mesh_data.positions, c);

            if (v1 - v0).cross(v2 - v0).length_squared() < 1e-20 {
                return Err(SceneError::DegenerateTriangle(model.name.clone()));
            }
            faces.push(Triangle::new(v0, v1, v2, material.clone()));
        }

        meshes.push(Mesh::new(model.name, faces));
    }

    Ok(meshes)
}

fn vertex_at(positions: &[f32], index: u32) -> Point3 {
    let base = index as usize * 3;
    Point3::new(
        positions[base] as f64,
        positions[base + 1] as f64,
        positions[base + 2] as f64,
    )
}

fn convert_material(src: &tobj::Material) -> Material {
    let color = |c: Option<[f32; 3]>, fallback: Color| match c {
        Some([r, g, b]) => Color::new(r as f64, g as f64, b as f64),
        None => fallback,
    };

    let emissive = src
        .unknown_param
        .get("Ke")
        .and_then(|v| parse_rgb_triplet(v))
        .unwrap_or_else(Color::zero);

    Material {
        ambient: color(src.ambient, Color::new(0.1, 0.1, 0.1)),
        diffuse: color(src.diffuse, Color::new(0.8, 0.8, 0.8)),
        specular: color(src.specular, Color::zero()),
        emissive,
        shininess: src.shininess.map(f64::from).unwrap_or(1.0),
        optical_density: src.optical_density.map(f64::from).unwrap_or(1.0),
        transparency: src.dissolve.map(f64::from).unwrap_or(1.0),
        illumination_model: IlluminationModel::from_illum(
            src.illumination_model.map(i32::from).unwrap_or(2),
        ),
    }
}

fn parse_rgb_triplet(s: &str) -> Option<Color> {
    let mut parts = s.split_whitespace();
    let r: f64 = parts.next()?.parse().ok()?;
    let g: f64 = parts.next()?.parse().ok()?;
    let b: f64 = parts.next()?.parse().ok()?;
    Some(Color::new(r, g, b))
}
