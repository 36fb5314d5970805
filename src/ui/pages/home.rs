use eframe::egui::{self, Align, Layout, RichText, vec2};

use super::header;
use crate::anim::FAST;
use crate::anim::transition::{ElementVisual, fade_in_after};
use crate::progress::ProgressSink;
use crate::ui::controls::button::{Button, ButtonVariant};
use crate::ui::controls::card::{Card, CardFlags};
use crate::ui::controls::frame_dt;
use crate::ui::controls::progress_bar::ProgressBar;
use crate::ui::theme::{FONT_BODY, FONT_SMALL, PALETTE, SPACING_MD, SPACING_XL};

pub const PROJECT_URL: &str = "https://flarial.xyz";
const PLAY_SIZE: [f32; 2] = [220.0, 48.0];
const PROGRESS_WIDTH: f32 = 320.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomeAction {
    Play,
    OpenProject,
}

pub struct HomePage {
    play: Button,
    play_visual: ElementVisual,
    project: Card,
    progress: ProgressBar,
    sink: ProgressSink,
}

impl HomePage {
    pub fn new(sink: ProgressSink) -> Self {
        Self {
            play: Button::new("PLAY", ButtonVariant::Primary),
            play_visual: ElementVisual::collapsed(),
            project: Card::new(CardFlags {
                clickable: true,
                ..CardFlags::default()
            }),
            progress: ProgressBar::new(),
            sink,
        }
    }

    /// Bring the PLAY button in once the launcher has finished loading.
    pub fn reveal(&mut self) {
        fade_in_after(Some(&mut self.play_visual), FAST);
    }

    /// A play flow is between its start and its cleanup.
    pub fn is_busy(&self) -> bool {
        self.sink.is_active()
    }

    /// Apply queued progress from the play flow.
    pub fn sync(&mut self) {
        self.sink.drain(&mut self.progress);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, enabled: bool) -> Option<HomeAction> {
        let mut action = None;
        if self.play_visual.tick(frame_dt(ui)).is_some() || self.play_visual.is_animating() {
            ui.ctx().request_repaint();
        }
        let busy = self.is_busy();
        self.play.set_enabled(enabled && !busy);

        header(ui, "Home", "Launch Minecraft with the Flarial client");
        ui.vertical_centered(|ui| {
            ui.add_space(SPACING_XL);
            ui.label(
                RichText::new("FLARIAL")
                    .size(48.0)
                    .strong()
                    .color(PALETTE.accent),
            );
            ui.add_space(SPACING_XL);

            if self.play_visual.is_visible() {
                let opacity = self.play_visual.opacity.get();
                ui.scope(|ui| {
                    ui.multiply_opacity(opacity);
                    if self.play.show(ui, PLAY_SIZE.into()) {
                        action = Some(HomeAction::Play);
                    }
                });
            }

            ui.add_space(SPACING_MD);
            if busy {
                ui.label(
                    RichText::new(self.sink.status())
                        .size(FONT_BODY)
                        .color(PALETTE.text_secondary),
                );
                ui.add_space(SPACING_MD);
                self.progress.show(ui, PROGRESS_WIDTH);
            }
        });

        ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
            let width = ui.available_width();
            let clicked = self.project.show(ui, vec2(width, 64.0), |ui| {
                ui.label(RichText::new("flarial.xyz").size(FONT_BODY).strong());
                ui.label(
                    RichText::new("News, guides and the client's source")
                        .size(FONT_SMALL)
                        .color(PALETTE.text_secondary),
                );
            });
            if clicked && enabled {
                action = Some(HomeAction::OpenProject);
            }
        });
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::NORMAL;
    use crate::progress::{ProgressReporter, StatusStyle};

    #[test]
    fn play_button_fades_in_after_a_short_hold() {
        let (_, sink) = ProgressReporter::channel(StatusStyle::Plain);
        let mut home = HomePage::new(sink);
        assert!(!home.play_visual.is_visible());
        home.reveal();
        assert!(home.play_visual.is_visible());
        home.play_visual.tick(FAST);
        assert_eq!(home.play_visual.opacity.get(), 0.0);
        home.play_visual.tick(NORMAL);
        assert_eq!(home.play_visual.opacity.get(), 1.0);
    }

    #[test]
    fn busy_follows_the_play_flow() {
        let (reporter, sink) = ProgressReporter::channel(StatusStyle::Plain);
        let mut home = HomePage::new(sink);
        reporter.started();
        home.sync();
        assert!(home.is_busy());
        reporter.finished();
        home.sync();
        assert!(!home.is_busy());
    }
}
