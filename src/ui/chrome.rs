//! Title bar and whole-window entrance/exit animation for the undecorated
//! window.

use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Id, Rect, Sense, ViewportCommand, pos2, vec2,
};

use crate::anim::{Animated, Easing, FAST, NORMAL, Tween};
use crate::ui::controls::{ease_to, frame_dt};
use crate::ui::theme::{FONT_BODY, FONT_MEDIUM, PALETTE, SPACING_MD, TITLE_BAR_HEIGHT};

const TITLE_BUTTON: [f32; 2] = [46.0, 30.0];
const ENTRANCE_SCALE: f32 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TitleAction {
    Minimize,
    Close,
}

struct TitleButton {
    glyph: &'static str,
    hover: Color32,
    background: Animated<Color32>,
}

impl TitleButton {
    fn new(glyph: &'static str, hover: Color32) -> Self {
        Self {
            glyph,
            hover,
            background: Animated::new(Color32::TRANSPARENT),
        }
    }

    fn show(&mut self, ui: &mut egui::Ui, rect: Rect, id: Id) -> bool {
        let response = ui.interact(rect, id, Sense::click());
        let target = if response.hovered() {
            self.hover
        } else {
            Color32::TRANSPARENT
        };
        ease_to(&mut self.background, target);
        if self.background.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }
        let painter = ui.painter();
        painter.rect_filled(rect, 0.0, self.background.get());
        let color = if response.hovered() {
            PALETTE.text_on_accent
        } else {
            PALETTE.text_secondary
        };
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            self.glyph,
            FontId::proportional(FONT_BODY),
            color,
        );
        response.clicked()
    }
}

pub struct WindowChrome {
    title: String,
    minimize: TitleButton,
    close: TitleButton,
    opacity: Animated<f32>,
    scale: Animated<f32>,
    closing: bool,
}

impl WindowChrome {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            minimize: TitleButton::new("—", PALETTE.surface_hover),
            close: TitleButton::new("✕", PALETTE.close_hover),
            opacity: Animated::new(0.0),
            scale: Animated::new(ENTRANCE_SCALE),
            closing: false,
        }
    }

    /// Fade and grow the window content into place.
    pub fn appear(&mut self) {
        self.opacity
            .start(Tween::new(0.0, 1.0, NORMAL).easing(Easing::CubicOut));
        self.scale
            .start(Tween::new(ENTRANCE_SCALE, 1.0, NORMAL).easing(Easing::CubicOut));
    }

    /// Start fading out. [`WindowChrome::tick`] reports when the window
    /// may actually close.
    pub fn begin_close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        self.opacity.animate_to(0.0, FAST, Easing::QuadIn);
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    /// `rect` scaled about its center by the entrance animation.
    pub fn content_rect(&self, rect: Rect) -> Rect {
        Rect::from_center_size(rect.center(), rect.size() * self.scale.get())
    }

    /// Returns `true` once the exit fade has finished.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.opacity.tick(dt);
        self.scale.tick(dt);
        self.closing && !self.opacity.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        self.opacity.is_animating() || self.scale.is_animating()
    }

    /// Draw the title bar along the top of `ui`. Dragging anywhere outside
    /// the buttons moves the window.
    pub fn show_title_bar(&mut self, ui: &mut egui::Ui) -> Option<TitleAction> {
        let (bar, _) = ui.allocate_exact_size(vec2(ui.available_width(), TITLE_BAR_HEIGHT), Sense::hover());
        let close_rect = Rect::from_min_size(
            pos2(bar.right() - TITLE_BUTTON[0], bar.top()),
            TITLE_BUTTON.into(),
        );
        let minimize_rect = close_rect.translate(vec2(-TITLE_BUTTON[0], 0.0));
        let drag_rect = Rect::from_min_max(bar.min, pos2(minimize_rect.left(), bar.bottom()));

        let drag = ui.interact(drag_rect, ui.id().with("title_drag"), Sense::click_and_drag());
        if drag.drag_started() {
            ui.ctx().send_viewport_cmd(ViewportCommand::StartDrag);
        }
        if drag.hovered() {
            ui.ctx().set_cursor_icon(CursorIcon::Grab);
        }

        let painter = ui.painter();
        painter.rect_filled(bar, 0.0, PALETTE.bg_medium);
        painter.text(
            pos2(bar.left() + SPACING_MD, bar.center().y),
            Align2::LEFT_CENTER,
            "◆",
            FontId::proportional(FONT_MEDIUM),
            PALETTE.accent,
        );
        painter.text(
            pos2(bar.left() + SPACING_MD + 24.0, bar.center().y),
            Align2::LEFT_CENTER,
            &self.title,
            FontId::proportional(FONT_BODY),
            PALETTE.text_secondary,
        );

        let (minimize_id, close_id) = (ui.id().with("title_minimize"), ui.id().with("title_close"));
        let mut action = None;
        if self.minimize.show(ui, minimize_rect, minimize_id) {
            action = Some(TitleAction::Minimize);
        }
        if self.close.show(ui, close_rect, close_id) {
            action = Some(TitleAction::Close);
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entrance_grows_and_fades_in() {
        let mut chrome = WindowChrome::new("Flarial");
        chrome.appear();
        assert_eq!(chrome.opacity(), 0.0);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!((chrome.content_rect(rect).width() - 95.0).abs() < 1e-3);
        assert!(!chrome.tick(NORMAL));
        assert_eq!(chrome.opacity(), 1.0);
        assert_eq!(chrome.content_rect(rect), rect);
    }

    #[test]
    fn close_waits_for_the_fade() {
        let mut chrome = WindowChrome::new("Flarial");
        chrome.appear();
        chrome.tick(NORMAL);
        chrome.begin_close();
        assert!(!chrome.tick(Duration::from_millis(50)));
        assert!(chrome.tick(Duration::from_millis(50)));
        assert_eq!(chrome.opacity(), 0.0);
    }
}
