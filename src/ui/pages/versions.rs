use std::time::Duration;

use eframe::egui::{self, RichText, ScrollArea};

use super::header;
use crate::anim::transition::{Direction, ElementVisual, stagger_slide_in};
use crate::progress::ProgressSink;
use crate::services::Catalog;
use crate::ui::controls::button::{Button, ButtonVariant};
use crate::ui::controls::list_item::VersionItem;
use crate::ui::controls::progress_bar::ProgressBar;
use crate::ui::theme::{FONT_BODY, PALETTE, SPACING_LG, SPACING_MD, SPACING_XS};

const ITEM_STAGGER: Duration = Duration::from_millis(50);
const INSTALL_SIZE: [f32; 2] = [180.0, 40.0];
const STATUS_HEIGHT: f32 = 56.0;

pub struct VersionsPage {
    items: Vec<VersionItem>,
    install: Button,
    progress: ProgressBar,
    sink: ProgressSink,
}

impl VersionsPage {
    pub fn new(sink: ProgressSink) -> Self {
        Self {
            items: Vec::new(),
            install: Button::new("Install Version", ButtonVariant::Primary),
            progress: ProgressBar::new(),
            sink,
        }
    }

    /// Replace the list with the installable catalog entries and bring them
    /// in one after another. The installed version is selected when listed,
    /// otherwise the newest one.
    pub fn populate(&mut self, catalog: &Catalog, installed: Option<&str>) {
        self.items = catalog
            .installable()
            .enumerate()
            .map(|(index, entry)| {
                VersionItem::new(
                    entry.version.clone(),
                    index == 0,
                    installed == Some(entry.version.as_str()),
                )
            })
            .collect();

        let mut visuals: Vec<ElementVisual> = self
            .items
            .iter_mut()
            .map(|item| std::mem::take(&mut item.visual))
            .collect();
        stagger_slide_in(&mut visuals, Direction::Up, ITEM_STAGGER);
        for (item, visual) in self.items.iter_mut().zip(visuals) {
            item.visual = visual;
        }

        let initial = self
            .items
            .iter()
            .position(|item| item.installed)
            .or((!self.items.is_empty()).then_some(0));
        if let Some(index) = initial {
            self.select(index);
        }
    }

    fn select(&mut self, index: usize) {
        for (position, item) in self.items.iter_mut().enumerate() {
            item.set_selected(position == index);
        }
        self.refresh_install_label();
    }

    pub fn selected(&self) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.is_selected())
            .map(|item| item.version.as_str())
    }

    /// Record a finished install of `version`.
    pub fn mark_installed(&mut self, version: &str) {
        for item in &mut self.items {
            item.installed = item.version == version;
        }
        self.refresh_install_label();
    }

    fn selected_is_installed(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.is_selected() && item.installed)
    }

    fn refresh_install_label(&mut self) {
        let label = if self.selected_is_installed() {
            "Already Installed"
        } else {
            "Install Version"
        };
        self.install.set_label(label);
    }

    pub fn is_busy(&self) -> bool {
        self.sink.is_active()
    }

    pub fn sync(&mut self) {
        self.sink.drain(&mut self.progress);
    }

    /// Returns the version to install when the install button was clicked.
    pub fn show(&mut self, ui: &mut egui::Ui, enabled: bool) -> Option<String> {
        let busy = self.is_busy();
        header(ui, "Versions", "Pick the game version to install");

        let list_height = ui.available_height() - INSTALL_SIZE[1] - STATUS_HEIGHT - SPACING_LG * 2.0;
        let mut clicked = None;
        ui.add_enabled_ui(enabled && !busy, |ui| {
            ScrollArea::vertical()
                .max_height(list_height.max(0.0))
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (index, item) in self.items.iter_mut().enumerate() {
                        if item.show(ui) {
                            clicked = Some(index);
                        }
                        ui.add_space(SPACING_XS);
                    }
                });
        });
        if let Some(index) = clicked.filter(|_| enabled && !busy) {
            self.select(index);
        }

        ui.add_space(SPACING_LG);
        self.install
            .set_enabled(enabled && !busy && self.selected().is_some() && !self.selected_is_installed());
        let install = self.install.show(ui, INSTALL_SIZE.into());

        ui.add_space(SPACING_MD);
        if busy {
            ui.label(
                RichText::new(self.sink.status())
                    .size(FONT_BODY)
                    .color(PALETTE.text_secondary),
            );
            ui.add_space(SPACING_XS);
            let width = ui.available_width();
            self.progress.show(ui, width);
        }

        if install {
            self.selected().map(str::to_owned)
        } else {
            None
        }
    }
}
