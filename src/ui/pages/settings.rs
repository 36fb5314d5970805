use std::path::PathBuf;

use eframe::egui::{self, Align, Layout, RichText, TextEdit, vec2};

use super::header;
use crate::config::{Configuration, DllBuild};
use crate::ui::controls::button::{Button, ButtonVariant};
use crate::ui::controls::card::{Card, CardFlags};
use crate::ui::controls::toggle::Toggle;
use crate::ui::theme::{
    FONT_BODY, FONT_MEDIUM, FONT_SMALL, PALETTE, SPACING_LG, SPACING_MD, SPACING_SM, SPACING_XS,
};

const BUILD_CARD_HEIGHT: f32 = 64.0;
const BROWSE_SIZE: [f32; 2] = [96.0, 30.0];

/// Settings surface. Every edit updates the owned [`Configuration`] and
/// reports it so the caller can persist it.
pub struct SettingsPage {
    config: Configuration,
    builds: [Card; 3],
    custom_path: String,
    browse: Button,
    hardware_acceleration: Toggle,
    wait_for_initialization: Toggle,
}

impl SettingsPage {
    pub fn new(config: Configuration) -> Self {
        let mut page = Self {
            builds: std::array::from_fn(|_| {
                Card::new(CardFlags {
                    selectable: true,
                    clickable: true,
                    ..CardFlags::default()
                })
            }),
            custom_path: String::new(),
            browse: Button::new("Browse", ButtonVariant::Secondary),
            hardware_acceleration: Toggle::new(true),
            wait_for_initialization: Toggle::new(true),
            config: Configuration::default(),
        };
        page.load(config);
        page
    }

    /// Reflect `config` in the controls without animating or raising
    /// change events.
    pub fn load(&mut self, config: Configuration) {
        for (card, build) in self.builds.iter_mut().zip(DllBuild::ALL) {
            card.set_selected(build == config.dll_build);
        }
        self.custom_path = config
            .custom_dll_path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.hardware_acceleration
            .set_state(config.hardware_acceleration, false);
        self.wait_for_initialization
            .set_state(config.wait_for_initialization, false);
        self.config = config;
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    fn select_build(&mut self, build: DllBuild) {
        for (card, candidate) in self.builds.iter_mut().zip(DllBuild::ALL) {
            card.set_selected(candidate == build);
        }
        self.config.dll_build = build;
    }

    fn set_custom_path(&mut self, text: String) {
        self.config.custom_dll_path = if text.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(text.trim()))
        };
        self.custom_path = text;
    }

    /// Returns the updated configuration when anything changed this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, enabled: bool) -> Option<Configuration> {
        let mut changed = false;
        header(ui, "Settings", "Client build and launch behaviour");
        ui.add_enabled_ui(enabled, |ui| {
            changed |= self.show_builds(ui);
            ui.add_space(SPACING_LG);
            changed |= self.show_custom_path(ui);
            ui.add_space(SPACING_LG);
            changed |= self.show_toggles(ui);
        });
        changed.then(|| self.config.clone())
    }

    fn show_builds(&mut self, ui: &mut egui::Ui) -> bool {
        section_title(ui, "Client build");
        let width = ui.available_width();
        let mut picked = None;
        for (card, build) in self.builds.iter_mut().zip(DllBuild::ALL) {
            let clicked = card.show(ui, vec2(width, BUILD_CARD_HEIGHT), |ui| {
                ui.label(RichText::new(build.label()).size(FONT_BODY).strong());
                ui.label(
                    RichText::new(build.description())
                        .size(FONT_SMALL)
                        .color(PALETTE.text_secondary),
                );
            });
            if clicked {
                picked = Some(build);
            }
            ui.add_space(SPACING_XS);
        }
        match picked {
            Some(build) if build != self.config.dll_build => {
                self.select_build(build);
                true
            }
            _ => false,
        }
    }

    fn show_custom_path(&mut self, ui: &mut egui::Ui) -> bool {
        section_title(ui, "Custom DLL");
        let mut changed = false;
        ui.horizontal(|ui| {
            let field_width = ui.available_width() - BROWSE_SIZE[0] - SPACING_SM;
            let mut text = self.custom_path.clone();
            let response = ui.add(
                TextEdit::singleline(&mut text)
                    .hint_text("Path to a .dll file")
                    .desired_width(field_width),
            );
            if response.changed() {
                self.set_custom_path(text);
                changed = true;
            }
            if self.browse.show(ui, BROWSE_SIZE.into())
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("dll", &["dll"])
                    .pick_file()
            {
                self.set_custom_path(path.to_string_lossy().into_owned());
                changed = true;
            }
        });
        changed
    }

    fn show_toggles(&mut self, ui: &mut egui::Ui) -> bool {
        section_title(ui, "Launch");
        let mut changed = false;
        if let Some(on) = toggle_row(
            ui,
            &mut self.hardware_acceleration,
            "Hardware Acceleration",
            "Render the launcher on the GPU. Applies after a restart.",
        ) {
            self.config.hardware_acceleration = on;
            changed = true;
        }
        ui.add_space(SPACING_SM);
        if let Some(on) = toggle_row(
            ui,
            &mut self.wait_for_initialization,
            "Wait for Initialization",
            "Only report success once the game has finished starting.",
        ) {
            self.config.wait_for_initialization = on;
            changed = true;
        }
        changed
    }
}

fn section_title(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).size(FONT_MEDIUM).strong());
    ui.add_space(SPACING_SM);
}

fn toggle_row(ui: &mut egui::Ui, toggle: &mut Toggle, title: &str, detail: &str) -> Option<bool> {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(title).size(FONT_BODY));
            ui.label(
                RichText::new(detail)
                    .size(FONT_SMALL)
                    .color(PALETTE.text_secondary),
            );
        });
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_space(SPACING_MD);
            toggle.show(ui)
        })
        .inner
    })
    .inner
}
