//! Renders the dialog currently holding the [`DialogService`] permit.

use eframe::egui::{self, Align, Color32, FontId, Id, Layout, Order, Rect, RichText, Sense, UiBuilder, vec2};

use crate::anim::transition::{ElementVisual, TransitionEnd, scale_in, scale_out};
use crate::anim::{Animated, Easing, FAST};
use crate::dialog::{DialogService, DialogView};
use crate::ui::controls::button::{Button, ButtonVariant};
use crate::ui::controls::frame_dt;
use crate::ui::theme::{
    FONT_BODY, FONT_LARGE, PALETTE, RADIUS_LARGE, SPACING_LG, SPACING_MD, SPACING_SM, fade,
};

const OVERLAY_ALPHA: f32 = 180.0;
const MIN_WIDTH: f32 = 300.0;
const MAX_WIDTH: f32 = 400.0;
const BUTTON_SIZE: [f32; 2] = [96.0, 32.0];

pub struct DialogHost {
    shown: Option<DialogView>,
    closing: Option<bool>,
    overlay: Animated<f32>,
    card: ElementVisual,
    primary: Button,
    secondary: Button,
}

impl Default for DialogHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogHost {
    pub fn new() -> Self {
        Self {
            shown: None,
            closing: None,
            overlay: Animated::new(0.0),
            card: ElementVisual::collapsed(),
            primary: Button::new("", ButtonVariant::Primary),
            secondary: Button::new("", ButtonVariant::Secondary),
        }
    }

    fn open(&mut self, view: DialogView) {
        self.primary.set_label(view.primary.clone());
        if let Some(secondary) = &view.secondary {
            self.secondary.set_label(secondary.clone());
        }
        self.overlay.animate_to(1.0, FAST, Easing::QuadOut);
        scale_in(Some(&mut self.card), None);
        self.shown = Some(view);
        self.closing = None;
    }

    fn close(&mut self, result: bool) {
        if self.closing.is_some() {
            return;
        }
        self.closing = Some(result);
        self.overlay.animate_to(0.0, FAST, Easing::QuadIn);
        scale_out(Some(&mut self.card), None);
    }

    /// Advance the animations. The service only hears the answer once the
    /// card has finished collapsing.
    fn tick(&mut self, dt: std::time::Duration, service: &DialogService) -> bool {
        self.overlay.tick(dt);
        let end = self.card.tick(dt);
        if end == Some(TransitionEnd::Collapsed)
            && let Some(result) = self.closing.take()
        {
            self.shown = None;
            service.respond(result);
        }
        self.overlay.is_animating() || self.card.is_animating()
    }

    pub fn show(&mut self, ctx: &egui::Context, service: &DialogService) {
        if self.shown.is_none()
            && let Some(view) = service.current()
        {
            self.open(view);
        }
        let Some(view) = self.shown.clone() else {
            return;
        };

        let screen = ctx.content_rect();
        let mut answer = None;
        egui::Area::new(Id::new("dialog_host"))
            .order(Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                if self.tick(frame_dt(ui), service) {
                    ui.ctx().request_repaint();
                }
                // Swallow clicks aimed at the page underneath.
                ui.allocate_rect(screen, Sense::click());
                let shade = (OVERLAY_ALPHA * self.overlay.get()).round() as u8;
                ui.painter().rect_filled(screen, 0.0, Color32::from_black_alpha(shade));

                let width = (screen.width() * 0.5).clamp(MIN_WIDTH, MAX_WIDTH);
                let inner_width = width - SPACING_LG * 2.0;
                let message = ui.painter().layout(
                    view.message.clone(),
                    FontId::proportional(FONT_BODY),
                    PALETTE.text_secondary,
                    inner_width,
                );
                let height =
                    SPACING_LG * 2.0 + FONT_LARGE + SPACING_MD * 2.0 + message.size().y + BUTTON_SIZE[1];
                let rest = Rect::from_center_size(screen.center(), vec2(width, height));
                let rect = Rect::from_center_size(rest.center(), rest.size() * self.card.scale());
                let opacity = self.card.opacity.get();

                ui.painter().rect_filled(rect, RADIUS_LARGE, fade(PALETTE.bg_medium, opacity));
                ui.painter().rect_stroke(
                    rect,
                    RADIUS_LARGE,
                    egui::Stroke::new(1.0, fade(PALETTE.border_subtle, opacity)),
                    egui::StrokeKind::Inside,
                );

                let mut body = ui.new_child(
                    UiBuilder::new()
                        .max_rect(rect.shrink(SPACING_LG))
                        .layout(Layout::top_down(Align::Min)),
                );
                body.set_opacity(opacity);
                body.label(RichText::new(&view.title).size(FONT_LARGE).strong());
                body.add_space(SPACING_MD);
                body.add(egui::Label::new(
                    RichText::new(&view.message)
                        .size(FONT_BODY)
                        .color(PALETTE.text_secondary),
                ));
                body.add_space(SPACING_MD);
                body.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if self.primary.show(ui, BUTTON_SIZE.into()) {
                        answer = Some(true);
                    }
                    if view.secondary.is_some() {
                        ui.add_space(SPACING_SM);
                        if self.secondary.show(ui, BUTTON_SIZE.into()) {
                            answer = Some(false);
                        }
                    }
                });
            });
        if let Some(result) = answer {
            self.close(result);
        }
    }
}
