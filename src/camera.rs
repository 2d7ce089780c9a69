//! Orbit/pan/zoom camera and perspective projection onto the egui canvas.

use eframe::egui;
use nalgebra::Vector3;

const NEAR: f64 = 0.1;
const ORBIT_SENSITIVITY: f64 = 0.005;
const PAN_SENSITIVITY: f64 = 0.0015;
const ZOOM_SENSITIVITY: f64 = 0.0015;
const MAX_PITCH: f64 = 1.54;
pub const MIN_DISTANCE: f64 = 5.0;
pub const MAX_DISTANCE: f64 = 400.0;

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vector3<f64>,
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
    pub fov_y: f64,
}

/// A world point after projection.
#[derive(Clone, Copy, Debug)]
pub struct Projected {
    pub pos: egui::Pos2,
    /// Distance along the view direction.
    pub depth: f64,
    /// Screen pixels per world unit at this depth.
    pub scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vector3::new(0.0, 30.0, 80.0), 60f64.to_radians())
    }
}

impl OrbitCamera {
    /// Camera placed at `eye`, looking at the origin.
    pub fn looking_from(eye: Vector3<f64>, fov_y: f64) -> Self {
        let distance = eye.norm();
        let pitch = (eye.y / distance).asin();
        let yaw = eye.x.atan2(eye.z);
        Self { target: Vector3::zeros(), yaw, pitch, distance, fov_y }
    }

    pub fn eye(&self) -> Vector3<f64> {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        self.target + Vector3::new(cp * sy, sp, cp * cy) * self.distance
    }

    /// Forward, right and up unit vectors.
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(&Vector3::y()).normalize();
        let up = right.cross(&forward);
        (forward, right, up)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx as f64 * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + dy as f64 * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (_, right, up) = self.basis();
        let step = self.distance * PAN_SENSITIVITY;
        self.target += (-right * dx as f64 + up * dy as f64) * step;
    }

    pub fn zoom(&mut self, scroll: f32) {
        let factor = (-(scroll as f64) * ZOOM_SENSITIVITY).exp();
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply mouse input from the scene widget.
    pub fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            if ui.input(|i| i.modifiers.shift) {
                self.pan(delta.x, delta.y);
            } else {
                self.orbit(delta.x, delta.y);
            }
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            self.pan(delta.x, delta.y);
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.zoom(scroll);
            }
        }
    }

    pub fn focal_length(&self, rect: egui::Rect) -> f64 {
        rect.height() as f64 * 0.5 / (self.fov_y * 0.5).tan()
    }

    /// Project a world point into `rect`. `None` when it is behind the camera.
    pub fn project(&self, point: Vector3<f64>, rect: egui::Rect) -> Option<Projected> {
        let (forward, right, up) = self.basis();
        let rel = point - self.eye();
        let depth = rel.dot(&forward);
        if depth < NEAR {
            return None;
        }
        let focal = self.focal_length(rect);
        let center = rect.center();
        let x = center.x as f64 + rel.dot(&right) / depth * focal;
        let y = center.y as f64 - rel.dot(&up) / depth * focal;
        Some(Projected {
            pos: egui::pos2(x as f32, y as f32),
            depth,
            scale: (focal / depth) as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn starts_at_reference_eye() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert!((eye - Vector3::new(0.0, 30.0, 80.0)).norm() < 1e-9);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = OrbitCamera::default();
        let p = cam.project(Vector3::zeros(), rect()).unwrap();
        assert!((p.pos.x - 400.0).abs() < 1e-3);
        assert!((p.pos.y - 300.0).abs() < 1e-3);
        assert!((p.depth - cam.distance).abs() < 1e-9);
    }

    #[test]
    fn points_behind_the_eye_are_culled() {
        let cam = OrbitCamera::default();
        let behind = cam.eye() * 2.0;
        assert!(cam.project(behind, rect()).is_none());
    }

    #[test]
    fn nearer_points_draw_larger() {
        let cam = OrbitCamera::default();
        let far = cam.project(Vector3::new(0.0, 0.0, -40.0), rect()).unwrap();
        let near = cam.project(Vector3::new(0.0, 0.0, 40.0), rect()).unwrap();
        assert!(near.scale > far.scale);
        assert!(near.depth < far.depth);
    }

    #[test]
    fn positive_x_lands_right_of_center() {
        let cam = OrbitCamera::default();
        let p = cam.project(Vector3::new(10.0, 0.0, 0.0), rect()).unwrap();
        assert!(p.pos.x > 400.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = OrbitCamera::default();
        for _ in 0..100 {
            cam.zoom(1000.0);
        }
        assert_eq!(cam.distance, MIN_DISTANCE);
        for _ in 0..100 {
            cam.zoom(-1000.0);
        }
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_pitch() {
        let mut cam = OrbitCamera::default();
        let d = cam.distance;
        cam.orbit(300.0, 10_000.0);
        assert!(((cam.eye() - cam.target).norm() - d).abs() < 1e-9);
        assert_eq!(cam.pitch, MAX_PITCH);
    }

    #[test]
    fn pan_moves_target_not_distance() {
        let mut cam = OrbitCamera::default();
        cam.pan(100.0, 0.0);
        assert!(cam.target.x < 0.0);
        assert!((cam.distance - 85.44003745317531).abs() < 1e-9);
    }
}
