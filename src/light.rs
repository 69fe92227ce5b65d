use crate::vec3::{Color, Point3};

/// A point light source. `PointLight::new` is the common case (white
/// light); `Light::new` lets the scene config give it an arbitrary tint.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Point3,
    pub intensity: f64,
    pub color: Color,
}

impl Light {
    pub fn new(position: Point3, intensity: f64, color: Color) -> Self {
        Self {
            position,
            intensity,
            color,
        }
    }
}

/// A `Light` variant with color fixed to white, matching the scene config's
/// `"type": "point"` entries (§6).
pub struct PointLight;

impl PointLight {
    pub fn new(position: Point3, intensity: f64) -> Light {
        Light::new(position, intensity, Color::ones())
    }
}
