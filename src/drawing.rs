//! Scene painting: starfield, orbit rings, and shaded sphere sprites for the
//! sun and every body, drawn back to front on the egui canvas.

use crate::bodies::{Body, SUN_COLOR, SUN_RADIUS};
use crate::camera::OrbitCamera;
use crate::loader::{TextureSlots, SUN_SLOT};
use crate::scene::Scene;
use crate::stars::Starfield;
use crate::texture::{Shading, SurfaceTexture};
use eframe::egui;
use nalgebra::{Matrix3, Rotation3, Vector3};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::sync::Arc;

const RING_SEGMENTS: usize = 128;
const RING_ALPHA: u8 = 25;
/// Smallest sprite worth shading; anything below is a plain dot.
const MIN_SPRITE_PX: f32 = 4.0;

struct Sprite {
    key: String,
    center: Vector3<f64>,
    radius: f64,
    spin: f64,
    shading_light: Option<Vector3<f64>>,
    texture: Arc<SurfaceTexture>,
    fallback: egui::Color32,
}

/// Owns the GPU handles for the sphere sprites between frames.
pub struct SceneRenderer {
    sprites: HashMap<String, egui::TextureHandle>,
    resolution: usize,
}

impl SceneRenderer {
    pub fn new(resolution: usize) -> Self {
        Self { sprites: HashMap::new(), resolution: resolution.max(8) }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        camera: &mut OrbitCamera,
        scene: &Scene,
        bodies: &[Body],
        stars: &Starfield,
        slots: &TextureSlots,
    ) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        camera.handle_input(ui, &response);
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        for star in stars.stars() {
            if let Some(p) = camera.project(star.position, rect) {
                let r = (0.1 * p.scale).clamp(0.6, 2.0);
                painter.circle_filled(p.pos, r, Starfield::color(star));
            }
        }

        let ring_stroke = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(RING_ALPHA));
        for body in bodies {
            for run in ring_runs(camera, rect, body.orbit_distance) {
                painter.add(egui::Shape::line(run, ring_stroke));
            }
        }

        let mut sprites = Vec::with_capacity(bodies.len() + 1);
        sprites.push(Sprite {
            key: SUN_SLOT.to_string(),
            center: Vector3::zeros(),
            radius: SUN_RADIUS,
            spin: scene.sun_spin(),
            shading_light: None,
            texture: slots
                .loaded(SUN_SLOT)
                .unwrap_or_else(|| Arc::new(SurfaceTexture::solid(SUN_COLOR))),
            fallback: SUN_COLOR,
        });
        for (body, placement) in bodies.iter().zip(scene.placements(bodies)) {
            let fallback = body.fallback_color();
            sprites.push(Sprite {
                key: placement.id,
                center: placement.position,
                radius: placement.radius,
                spin: placement.spin,
                shading_light: Some(-placement.position),
                texture: slots
                    .loaded(&body.id)
                    .unwrap_or_else(|| Arc::new(SurfaceTexture::solid(fallback))),
                fallback,
            });
        }

        let view = view_matrix(camera);
        let mut visible: Vec<(f64, &Sprite, egui::Pos2, f32)> = sprites
            .iter()
            .filter_map(|s| {
                let p = camera.project(s.center, rect)?;
                Some((p.depth, s, p.pos, (s.radius as f32 * p.scale).max(0.5)))
            })
            .collect();
        // Farthest first so nearer bodies overdraw.
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));

        let ctx = ui.ctx().clone();
        for (_, sprite, pos, radius_px) in visible {
            if radius_px * 2.0 < MIN_SPRITE_PX {
                painter.circle_filled(pos, radius_px.max(1.0), sprite.fallback);
                continue;
            }
            let size = ((radius_px * 2.0).ceil() as usize).clamp(8, self.resolution);
            let rot = view * spin_rotation(sprite.spin);
            let shading = match sprite.shading_light {
                None => Shading::Emissive,
                Some(to_sun) => Shading::Lit { light: view_light(&view, to_sun) },
            };
            let image = sprite.texture.render_sphere(size, &rot, shading);
            let handle = match self.sprites.entry(sprite.key.clone()) {
                Entry::Occupied(entry) => {
                    let handle = entry.into_mut();
                    handle.set(image, egui::TextureOptions::LINEAR);
                    handle
                }
                Entry::Vacant(entry) => entry.insert(ctx.load_texture(
                    format!("sphere-{}", sprite.key),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
            };
            painter.image(
                handle.id(),
                egui::Rect::from_center_size(pos, egui::Vec2::splat(radius_px * 2.0)),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        self.sprites.retain(|key, _| sprites.iter().any(|s| &s.key == key));
    }
}

/// World to view space: rows are right, up, and towards the viewer.
fn view_matrix(camera: &OrbitCamera) -> Matrix3<f64> {
    let (forward, right, up) = camera.basis();
    Matrix3::from_rows(&[right.transpose(), up.transpose(), (-forward).transpose()])
}

fn spin_rotation(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle).into_inner()
}

/// Direction towards the sun in view space. A body sitting on the sun is lit
/// from the front.
fn view_light(view: &Matrix3<f64>, to_sun: Vector3<f64>) -> Vector3<f64> {
    match to_sun.try_normalize(1e-9) {
        Some(dir) => view * dir,
        None => Vector3::z(),
    }
}

/// Closed circle of `distance` in the orbital plane.
pub fn ring_points(distance: f64, segments: usize) -> Vec<Vector3<f64>> {
    (0..=segments)
        .map(|i| {
            let a = i as f64 / segments as f64 * TAU;
            Vector3::new(distance * a.cos(), 0.0, distance * a.sin())
        })
        .collect()
}

/// Screen polylines for one ring, split wherever it passes behind the camera.
fn ring_runs(camera: &OrbitCamera, rect: egui::Rect, distance: f64) -> Vec<Vec<egui::Pos2>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in ring_points(distance, RING_SEGMENTS) {
        match camera.project(point, rect) {
            Some(p) => current.push(p.pos),
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}
