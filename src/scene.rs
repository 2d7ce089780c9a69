//! Per-frame orbital motion.
//!
//! Motion is keyed by body id so that edits and preset loads keep a body's
//! current angle; only ids that vanish from the list lose their state.

use crate::bodies::Body;
use nalgebra::Vector3;
use std::collections::HashMap;

/// Orbit advance per frame for a body with `speed == 1.0` (0.2 rad/s at 60 fps).
pub const ORBIT_STEP: f64 = 0.2 / 60.0;
pub const BODY_SPIN_STEP: f64 = 0.01;
pub const SUN_SPIN_STEP: f64 = 0.002;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub orbit_angle: f64,
    pub spin: f64,
}

/// Where a body is drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub id: String,
    pub position: Vector3<f64>,
    pub radius: f64,
    pub spin: f64,
}

#[derive(Default)]
pub struct Scene {
    motions: HashMap<String, Motion>,
    sun_spin: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step every body and the sun by one frame.
    pub fn advance(&mut self, bodies: &[Body]) {
        self.motions.retain(|id, _| bodies.iter().any(|b| &b.id == id));
        for body in bodies {
            let motion = self.motions.entry(body.id.clone()).or_default();
            motion.orbit_angle += body.speed * ORBIT_STEP;
            motion.spin += BODY_SPIN_STEP;
        }
        self.sun_spin += SUN_SPIN_STEP;
    }

    pub fn motion(&self, id: &str) -> Motion {
        self.motions.get(id).copied().unwrap_or_default()
    }

    pub fn sun_spin(&self) -> f64 {
        self.sun_spin
    }

    pub fn placements(&self, bodies: &[Body]) -> Vec<Placement> {
        bodies
            .iter()
            .map(|body| {
                let motion = self.motion(&body.id);
                Placement {
                    id: body.id.clone(),
                    position: orbit_position(body.orbit_distance, motion.orbit_angle),
                    radius: body.size,
                    spin: motion.spin,
                }
            })
            .collect()
    }
}

/// Point on a circular orbit in the ecliptic (XZ) plane, counter-clockwise
/// seen from +Y.
pub fn orbit_position(distance: f64, angle: f64) -> Vector3<f64> {
    Vector3::new(distance * angle.cos(), 0.0, -distance * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::default_bodies;

    #[test]
    fn orbit_angle_never_decreases() {
        let mut bodies = default_bodies();
        bodies[0].speed = 0.0;
        let mut scene = Scene::new();
        let mut last: Vec<f64> = bodies.iter().map(|b| scene.motion(&b.id).orbit_angle).collect();
        for _ in 0..500 {
            scene.advance(&bodies);
            for (b, prev) in bodies.iter().zip(last.iter_mut()) {
                let now = scene.motion(&b.id).orbit_angle;
                assert!(now >= *prev);
                *prev = now;
            }
        }
        assert_eq!(scene.motion("mercury").orbit_angle, 0.0);
        assert!((scene.motion("earth").orbit_angle - 500.0 * ORBIT_STEP).abs() < 1e-9);
    }

    #[test]
    fn spin_ignores_speed() {
        let bodies = default_bodies();
        let mut scene = Scene::new();
        for _ in 0..10 {
            scene.advance(&bodies);
        }
        let mercury = scene.motion("mercury").spin;
        let neptune = scene.motion("neptune").spin;
        assert_eq!(mercury, neptune);
        assert!((mercury - 10.0 * BODY_SPIN_STEP).abs() < 1e-12);
        assert!((scene.sun_spin() - 10.0 * SUN_SPIN_STEP).abs() < 1e-12);
    }

    #[test]
    fn default_bodies_stay_at_distinct_distances() {
        let bodies = default_bodies();
        let mut scene = Scene::new();
        for _ in 0..240 {
            scene.advance(&bodies);
            let mut distances: Vec<f64> = scene
                .placements(&bodies)
                .iter()
                .map(|p| p.position.norm())
                .collect();
            for (p, b) in distances.iter().zip(&bodies) {
                assert!((p - b.orbit_distance).abs() < 1e-9);
            }
            distances.sort_by(|a, b| a.total_cmp(b));
            assert!(distances.windows(2).all(|w| w[1] - w[0] > 1.0));
        }
    }

    #[test]
    fn edits_keep_the_current_angle() {
        let mut bodies = default_bodies();
        let mut scene = Scene::new();
        for _ in 0..30 {
            scene.advance(&bodies);
        }
        let before = scene.motion("earth").orbit_angle;
        bodies[2].orbit_distance = 50.0;
        bodies[2].speed = 0.0;
        scene.advance(&bodies);
        assert_eq!(scene.motion("earth").orbit_angle, before);
    }

    #[test]
    fn removed_bodies_are_forgotten() {
        let mut bodies = default_bodies();
        let mut scene = Scene::new();
        scene.advance(&bodies);
        bodies.retain(|b| b.id != "mars");
        scene.advance(&bodies);
        assert_eq!(scene.motion("mars"), Motion::default());
        assert_eq!(scene.placements(&bodies).len(), 7);
    }
}
