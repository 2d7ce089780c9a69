//! Application shell and eframe integration.
//!
//! Wires the body list, the orbital scene, texture loading, and the preset
//! session together, and lays out the header, banner, side panel, and canvas.

use crate::bodies::{default_bodies, sun_texture_url};
use crate::camera::OrbitCamera;
use crate::config::{AppConfig, API_KEY_VAR, PROJECT_ID_VAR};
use crate::drawing::SceneRenderer;
use crate::loader::{TextureSlots, SUN_SLOT};
use crate::panel::{PanelAction, PanelState};
use crate::scene::Scene;
use crate::session::{LoadOutcome, Session};
use crate::stars::Starfield;
use crate::state::BodyState;
use crate::store::{ConfigStore, FirestoreStore, MemoryStore, StoreWorker};
use crate::texture::HttpFetcher;
use eframe::egui;
use std::sync::Arc;

const STAR_RADIUS: f64 = 100.0;
const STAR_DEPTH: f64 = 50.0;

pub(crate) struct App {
    state: BodyState,
    scene: Scene,
    camera: OrbitCamera,
    panel: PanelState,
    session: Session,
    slots: TextureSlots,
    stars: Starfield,
    renderer: SceneRenderer,
    sun_texture: String,
    title: String,
}

impl App {
    pub(crate) fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let ctx = cc.egui_ctx.clone();
        let mut session = open_session(&config, &ctx);
        if session.is_enabled() {
            session.refresh();
        }

        let slots = TextureSlots::new(Arc::new(HttpFetcher::new())).with_repaint(ctx);
        let stars = Starfield::generate(config.scene.star_count, STAR_RADIUS, STAR_DEPTH, config.scene.star_seed);
        log::info!("generated {} background stars", stars.len());

        Self {
            state: BodyState::new(default_bodies()),
            scene: Scene::new(),
            camera: OrbitCamera::default(),
            panel: PanelState::default(),
            session,
            slots,
            stars,
            renderer: SceneRenderer::new(config.scene.sphere_resolution),
            sun_texture: sun_texture_url(),
            title: config.window.title,
        }
    }

    /// Keep one texture task per body with a texture, plus the sun.
    fn sync_textures(&mut self) {
        self.slots.sync(SUN_SLOT, Some(&self.sun_texture));
        for body in self.state.bodies() {
            self.slots.sync(&body.id, body.texture.as_deref());
        }
        let keys: Vec<&str> = std::iter::once(SUN_SLOT)
            .chain(self.state.bodies().iter().map(|b| b.id.as_str()))
            .collect();
        self.slots.retain(keys);
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::Save(name) => {
                self.session.save(&name, &self.state);
            }
            PanelAction::Load(id) => {
                self.session.load(&id);
            }
        }
    }
}

/// Pick the backing store from the settings. Without credentials the session
/// is disabled and every persistence action reports it.
fn open_session(config: &AppConfig, ctx: &egui::Context) -> Session {
    let store: Box<dyn ConfigStore> = if config.store.offline {
        log::info!("offline mode: saved configurations last for this run only");
        Box::new(MemoryStore::new())
    } else if config.store.is_configured() {
        log::info!(
            "using Firestore project {} collection {}",
            config.store.project_id,
            config.store.collection
        );
        Box::new(FirestoreStore::new(
            &config.store.project_id,
            &config.store.collection,
            &config.store.api_key,
        ))
    } else {
        log::warn!("Firestore credentials missing or placeholders; save and load are disabled");
        return Session::disabled();
    };
    match StoreWorker::spawn(store, Some(ctx.clone())) {
        Ok(worker) => Session::new(worker),
        Err(e) => {
            log::error!("could not start the configuration store worker: {e}");
            Session::disabled()
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals({
            let mut vis = egui::Visuals::dark();
            vis.extreme_bg_color = egui::Color32::BLACK;
            vis
        });

        for outcome in self.session.poll(&mut self.state) {
            if let LoadOutcome::Replaced(count) = outcome {
                log::debug!("scene now shows {count} bodies");
            }
        }
        self.slots.poll();
        self.sync_textures();
        self.scene.advance(self.state.bodies());

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&self.title);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("v{} {}", env!("CARGO_PKG_VERSION"), crate::BUILD_HASH))
                            .small()
                            .weak(),
                    );
                    let pending = self.slots.pending();
                    if pending > 0 {
                        ui.label(egui::RichText::new(format!("loading {pending} textures")).weak());
                        ui.spinner();
                    }
                });
            });
            if !self.session.is_enabled() {
                ui.colored_label(
                    egui::Color32::from_rgb(230, 190, 80),
                    format!(
                        "⚠ Saving is off: set {API_KEY_VAR} and {PROJECT_ID_VAR}, or run with --offline"
                    ),
                );
            }
            if let Some(message) = self.session.banner().map(str::to_string) {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgb(90, 20, 20))
                    .inner_margin(6.0)
                    .corner_radius(4.0)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.colored_label(egui::Color32::from_rgb(255, 200, 200), message);
                            if ui.small_button("✖").clicked() {
                                self.session.dismiss_banner();
                            }
                        });
                    });
                ui.add_space(4.0);
            }
        });

        let mut action = None;
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.panel.show(ui, &mut self.state, &self.session);
                });
            });
        if let Some(action) = action {
            self.apply(action);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                self.renderer.show(
                    ui,
                    &mut self.camera,
                    &self.scene,
                    self.state.bodies(),
                    &self.stars,
                    &self.slots,
                );
            });

        ctx.request_repaint();
    }
}
