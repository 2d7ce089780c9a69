//! Orbiting bodies and the reference solar system they start from.

use egui::Color32;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub id: String,
    pub name: String,
    pub size: f64,
    pub speed: f64,
    pub orbit_distance: f64,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

impl Body {
    /// Solid color drawn until (or instead of) the surface texture.
    pub fn fallback_color(&self) -> Color32 {
        Color32::from_hex(&self.color).unwrap_or(Color32::GRAY)
    }

    pub fn get(&self, attribute: BodyAttribute) -> f64 {
        match attribute {
            BodyAttribute::Size => self.size,
            BodyAttribute::Speed => self.speed,
            BodyAttribute::OrbitDistance => self.orbit_distance,
        }
    }

    pub fn set(&mut self, attribute: BodyAttribute, value: f64) {
        match attribute {
            BodyAttribute::Size => self.size = value,
            BodyAttribute::Speed => self.speed = value,
            BodyAttribute::OrbitDistance => self.orbit_distance = value,
        }
    }
}

/// The numeric attributes a user can edit from the side panel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BodyAttribute {
    Size,
    Speed,
    OrbitDistance,
}

impl BodyAttribute {
    pub const ALL: [BodyAttribute; 3] = [
        BodyAttribute::Size,
        BodyAttribute::Speed,
        BodyAttribute::OrbitDistance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BodyAttribute::Size => "Size",
            BodyAttribute::Speed => "Speed",
            BodyAttribute::OrbitDistance => "Orbit Distance",
        }
    }

    pub fn range(&self) -> std::ops::RangeInclusive<f64> {
        match self {
            BodyAttribute::Size => 0.1..=5.0,
            BodyAttribute::Speed => 0.001..=5.0,
            BodyAttribute::OrbitDistance => 5.0..=100.0,
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            BodyAttribute::Size => 0.1,
            BodyAttribute::Speed => 0.001,
            BodyAttribute::OrbitDistance => 0.5,
        }
    }

    pub fn decimals(&self) -> usize {
        match self {
            BodyAttribute::Speed => 2,
            _ => 1,
        }
    }

    pub fn describe(&self, value: f64) -> String {
        format!("{}: {:.*}", self.label(), self.decimals(), value)
    }
}

const THREE_JS_PLANETS: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/master/examples/textures/planets";

fn body(
    id: &str,
    name: &str,
    size: f64,
    speed: f64,
    orbit_distance: f64,
    color: &str,
    texture: String,
) -> Body {
    Body {
        id: id.to_string(),
        name: name.to_string(),
        size,
        speed,
        orbit_distance,
        color: color.to_string(),
        texture: Some(texture),
    }
}

/// The eight planets the visualizer opens with.
pub fn default_bodies() -> Vec<Body> {
    let planet = |file: &str| format!("{THREE_JS_PLANETS}/{file}");
    vec![
        body(
            "mercury",
            "Mercury",
            0.4,
            4.1,
            5.0,
            "#A9A9A9",
            "https://res.cloudinary.com/dqxnq7md1/image/upload/v1741087236/IKAURS%203D%20PROJECT/dumow3bfxp6w0n818ypl.jpg".to_string(),
        ),
        body("venus", "Venus", 0.9, 1.6, 7.2, "#E6E6FA", planet("venus.jpg")),
        body("earth", "Earth", 1.0, 1.0, 10.0, "#1E90FF", planet("earth.jpg")),
        body("mars", "Mars", 0.5, 0.5, 15.0, "#FF4500", planet("mars.jpg")),
        body("jupiter", "Jupiter", 2.5, 0.08, 25.0, "#F4A460", planet("jupiter.jpg")),
        body("saturn", "Saturn", 2.2, 0.03, 40.0, "#FFD700", planet("saturn.jpg")),
        body("uranus", "Uranus", 1.8, 0.01, 60.0, "#00FFFF", planet("uranus.jpg")),
        body("neptune", "Neptune", 1.8, 0.006, 80.0, "#4169E1", planet("neptune.jpg")),
    ]
}

/// Texture used for the central star.
pub fn sun_texture_url() -> String {
    format!("{THREE_JS_PLANETS}/venus.jpg")
}

pub const SUN_RADIUS: f64 = 3.0;
pub const SUN_COLOR: Color32 = Color32::from_rgb(0xFD, 0xB8, 0x13);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_ids_are_unique() {
        let bodies = default_bodies();
        assert_eq!(bodies.len(), 8);
        let ids: HashSet<_> = bodies.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), bodies.len());
    }

    #[test]
    fn default_values_sit_inside_editing_ranges() {
        for b in default_bodies() {
            for attr in BodyAttribute::ALL {
                assert!(attr.range().contains(&b.get(attr)), "{} {:?}", b.id, attr);
            }
        }
    }

    #[test]
    fn fallback_color_parses_hex() {
        let earth = &default_bodies()[2];
        assert_eq!(earth.fallback_color(), Color32::from_rgb(0x1E, 0x90, 0xFF));

        let mut odd = earth.clone();
        odd.color = "not a color".to_string();
        assert_eq!(odd.fallback_color(), Color32::GRAY);
    }

    #[test]
    fn wire_names_are_camel_case() {
        let value = serde_json::to_value(&default_bodies()[0]).unwrap();
        assert_eq!(value["orbitDistance"], 5.0);
        assert!(value.get("orbit_distance").is_none());
    }

    #[test]
    fn labels_follow_attribute_precision() {
        assert_eq!(BodyAttribute::Size.describe(1.0), "Size: 1.0");
        assert_eq!(BodyAttribute::Speed.describe(0.006), "Speed: 0.01");
        assert_eq!(BodyAttribute::OrbitDistance.describe(12.34), "Orbit Distance: 12.3");
    }
}
