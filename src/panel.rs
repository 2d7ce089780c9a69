//! Side-panel controls: preset save/load and per-body attribute editing.

use crate::bodies::BodyAttribute;
use crate::session::Session;
use crate::state::BodyState;
use crate::store::Configuration;
use eframe::egui;

/// What the panel asks the application to do after this frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelAction {
    Save(String),
    Load(String),
}

#[derive(Default)]
pub struct PanelState {
    pub config_name_input: String,
    pub selected_body_id: Option<String>,
    pub dropdown_open: bool,
}

impl PanelState {
    /// Select `id`, or clear the selection if it is already selected.
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected_body_id.as_deref() == Some(id) {
            self.selected_body_id = None;
        } else {
            self.selected_body_id = Some(id.to_string());
        }
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    /// Pick a saved configuration from the dropdown. Entries without an id
    /// cannot be loaded and leave the dropdown open.
    pub fn choose(&mut self, config: &Configuration) -> Option<PanelAction> {
        let id = config.id.clone()?;
        self.dropdown_open = false;
        Some(PanelAction::Load(id))
    }

    /// Hand over the typed name and clear the field, if saving is allowed.
    pub fn submit_save(&mut self, session: &Session) -> Option<PanelAction> {
        if !session.can_save(&self.config_name_input) {
            return None;
        }
        Some(PanelAction::Save(std::mem::take(&mut self.config_name_input)))
    }

    /// Forget a selection that no longer names a body.
    pub fn prune_selection(&mut self, state: &BodyState) {
        if let Some(id) = &self.selected_body_id {
            if state.body(id).is_none() {
                self.selected_body_id = None;
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, state: &mut BodyState, session: &Session) -> Option<PanelAction> {
        let mut action = None;
        self.prune_selection(state);

        ui.heading("Configuration Panel");
        ui.add_space(8.0);

        ui.label(egui::RichText::new("Save Configuration").strong());
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.config_name_input)
                    .hint_text("Enter configuration name")
                    .desired_width(180.0),
            );
            let enabled = session.can_save(&self.config_name_input);
            if ui.add_enabled(enabled, egui::Button::new("💾 Save")).clicked() {
                action = self.submit_save(session);
            }
        });
        if session.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(egui::RichText::new("Talking to the store…").weak());
            });
        }

        ui.separator();
        ui.label(egui::RichText::new("Load Configuration").strong());
        if ui.button("Select a configuration ⏷").clicked() {
            self.toggle_dropdown();
        }
        if self.dropdown_open {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                    if session.saved().is_empty() {
                        ui.label(egui::RichText::new("No saved configurations").weak());
                    }
                    for config in session.saved() {
                        if ui.button(&config.name).clicked() {
                            if let Some(load) = self.choose(config) {
                                action = Some(load);
                            }
                        }
                    }
                });
            });
        }

        ui.separator();
        ui.label(egui::RichText::new("Select Planet").strong());
        let mut clicked = None;
        egui::Grid::new("body_grid").num_columns(4).spacing([6.0, 6.0]).show(ui, |ui| {
            for (i, body) in state.bodies().iter().enumerate() {
                let selected = self.selected_body_id.as_deref() == Some(body.id.as_str());
                if ui.selectable_label(selected, &body.name).clicked() {
                    clicked = Some(body.id.clone());
                }
                if i % 4 == 3 {
                    ui.end_row();
                }
            }
        });
        if let Some(id) = clicked {
            self.toggle_selection(&id);
        }

        ui.separator();
        ui.label(egui::RichText::new("Planet Properties").strong());
        match self.selected_body_id.clone() {
            Some(id) => show_body_controls(ui, state, &id),
            None => {
                ui.label(egui::RichText::new("Select a planet to modify its properties").weak());
            }
        }

        action
    }
}

fn show_body_controls(ui: &mut egui::Ui, state: &mut BodyState, id: &str) {
    let Some(body) = state.body(id) else {
        return;
    };
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&body.name).size(16.0).strong());
        let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 9.0, body.fallback_color());
    });

    let current: Vec<(BodyAttribute, f64)> = BodyAttribute::ALL.iter().map(|&a| (a, body.get(a))).collect();
    for (attribute, mut value) in current {
        ui.label(attribute.describe(value));
        let slider = egui::Slider::new(&mut value, attribute.range())
            .step_by(attribute.step())
            .show_value(false);
        if ui.add(slider).changed() {
            state.set_attribute(id, attribute, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::default_bodies;

    #[test]
    fn clicking_the_same_body_twice_deselects() {
        let mut panel = PanelState::default();
        panel.toggle_selection("earth");
        assert_eq!(panel.selected_body_id.as_deref(), Some("earth"));
        panel.toggle_selection("mars");
        assert_eq!(panel.selected_body_id.as_deref(), Some("mars"));
        panel.toggle_selection("mars");
        assert_eq!(panel.selected_body_id, None);
    }

    #[test]
    fn choosing_closes_the_dropdown() {
        let mut panel = PanelState::default();
        panel.toggle_dropdown();
        assert!(panel.dropdown_open);

        let mut unsaved = Configuration::draft("draft", default_bodies());
        assert_eq!(panel.choose(&unsaved), None);
        assert!(panel.dropdown_open);

        unsaved.id = Some("abc".to_string());
        assert_eq!(panel.choose(&unsaved), Some(PanelAction::Load("abc".to_string())));
        assert!(!panel.dropdown_open);
    }

    #[test]
    fn submit_clears_the_name_only_when_allowed() {
        let session = Session::disabled();
        let mut panel = PanelState { config_name_input: "   ".to_string(), ..Default::default() };
        assert_eq!(panel.submit_save(&session), None);
        assert_eq!(panel.config_name_input, "   ");

        panel.config_name_input = "Outer giants".to_string();
        assert_eq!(panel.submit_save(&session), Some(PanelAction::Save("Outer giants".to_string())));
        assert!(panel.config_name_input.is_empty());
    }

    #[test]
    fn vanished_selection_is_pruned() {
        let mut panel = PanelState::default();
        panel.toggle_selection("earth");
        let mut state = BodyState::new(default_bodies());
        panel.prune_selection(&state);
        assert!(panel.selected_body_id.is_some());
        state.replace_all(Vec::new());
        panel.prune_selection(&state);
        assert!(panel.selected_body_id.is_none());
    }
}
