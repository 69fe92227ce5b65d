use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::SceneError;
use crate::light::{Light, PointLight};
use crate::vec3::{Color, Point3};

/// On-disk scene lighting document: a flat ambient term plus a map of named
/// light entries (§6).
#[derive(Debug, Deserialize)]
struct LightingDocument {
    #[serde(default)]
    ambient_light: f64,
    #[serde(default)]
    lights: HashMap<String, LightEntry>,
}

#[derive(Debug, Deserialize)]
struct LightEntry {
    #[serde(rename = "type")]
    kind: String,
    position: [f64; 3],
    intensity: f64,
    #[serde(default)]
    color: Option<[f64; 3]>,
}

/// The parsed result of loading a scene config: the ambient term and the
/// list of lights, in no particular order (the source document is a map).
pub struct SceneConfig {
    pub ambient_light: f64,
    pub lights: Vec<Light>,
}

pub fn load_scene_config(path: &Path) -> Result<SceneConfig, SceneError> {
    let text = std::fs::read_to_string(path)?;
    parse_scene_config(&text)
}

fn parse_scene_config(text: &str) -> Result<SceneConfig, SceneError> {
    let doc: LightingDocument =
        serde_json::from_str(text).map_err(|e| SceneError::ConfigParse(e.to_string()))?;

    let mut lights = Vec::with_capacity(doc.lights.len());
    for (_id, entry) in doc.lights {
        let position = Point3::new(entry.position[0], entry.position[1], entry.position[2]);
        let light = match entry.kind.as_str() {
            "point" | "default" => match entry.color {
                Some([r, g, b]) => Light::new(position, entry.intensity, Color::new(r, g, b)),
                None => PointLight::new(position, entry.intensity),
            },
            other => return Err(SceneError::UnknownLightType(other.to_string())),
        };
        lights.push(light);
    }

    Ok(SceneConfig {
        ambient_light: doc.ambient_light,
        lights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_document() {
        let json = r#"{
            "ambient_light": 0.15,
            "lights": {
                "key": { "type": "point", "position": [0.0, 5.0, 0.0], "intensity": 2.0 }
            }
        }"#;
        let config = parse_scene_config(json).unwrap();
        assert_eq!(config.ambient_light, 0.15);
        assert_eq!(config.lights.len(), 1);
        assert_eq!(config.lights[0].intensity, 2.0);
    }

    #[test]
    fn custom_color_overrides_the_point_light_default() {
        let json = r#"{
            "ambient_light": 0.0,
            "lights": {
                "warm": { "type": "default", "position": [1.0, 1.0, 1.0], "intensity": 1.0, "color": [1.0, 0.6, 0.3] }
            }
        }"#;
        let config = parse_scene_config(json).unwrap();
        assert_eq!(config.lights[0].color, Color::new(1.0, 0.6, 0.3));
    }

    #[test]
    fn unknown_light_type_is_rejected() {
        let json = r#"{
            "ambient_light": 0.0,
            "lights": {
                "bad": { "type": "spot", "position": [0.0, 0.0, 0.0], "intensity": 1.0 }
            }
        }"#;
        assert!(parse_scene_config(json).is_err());
    }
}
