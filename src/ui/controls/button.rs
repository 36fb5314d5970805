use std::time::Duration;

use eframe::egui::{self, Align2, Color32, CursorIcon, FontId, Rect, Sense, Vec2};

use super::{Interaction, PointerEvent, PointerTracker, ease_to, frame_dt, paint_glow, tick_all};
use crate::anim::Animated;
use crate::ui::theme::{FONT_BODY, PALETTE, RADIUS_MEDIUM, fade};

const PRESSED_SCALE: f32 = 0.96;
const GLOW_BLUR: f32 = 20.0;
const GLOW_OPACITY: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Ghost,
}

impl ButtonVariant {
    fn colors(self) -> [Color32; 3] {
        match self {
            ButtonVariant::Primary => [PALETTE.accent, PALETTE.accent_hover, PALETTE.accent_pressed],
            ButtonVariant::Secondary => [
                PALETTE.surface,
                PALETTE.surface_hover,
                PALETTE.surface_active,
            ],
            ButtonVariant::Ghost => [
                Color32::TRANSPARENT,
                PALETTE.surface_hover,
                PALETTE.surface_active,
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonState {
    #[default]
    Idle,
    Hovered,
    Pressed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ButtonTargets {
    pub background: Color32,
    pub scale: f32,
    pub glow_blur: f32,
    pub glow_opacity: f32,
}

/// Visual targets for a button resting in `state`.
#[must_use]
pub fn targets(state: ButtonState, variant: ButtonVariant) -> ButtonTargets {
    let [idle, hover, pressed] = variant.colors();
    let glowing = variant == ButtonVariant::Primary && state != ButtonState::Idle;
    ButtonTargets {
        background: match state {
            ButtonState::Idle => idle,
            ButtonState::Hovered => hover,
            ButtonState::Pressed => pressed,
        },
        scale: if state == ButtonState::Pressed {
            PRESSED_SCALE
        } else {
            1.0
        },
        glow_blur: if glowing { GLOW_BLUR } else { 0.0 },
        glow_opacity: if glowing { GLOW_OPACITY } else { 0.0 },
    }
}

#[must_use]
pub fn transition(
    state: ButtonState,
    event: PointerEvent,
    variant: ButtonVariant,
) -> (ButtonState, ButtonTargets) {
    let next = match event {
        PointerEvent::Enter => ButtonState::Hovered,
        PointerEvent::Leave => ButtonState::Idle,
        PointerEvent::Down => ButtonState::Pressed,
        PointerEvent::Up if state == ButtonState::Pressed => ButtonState::Hovered,
        PointerEvent::Up => state,
    };
    (next, targets(next, variant))
}

pub struct Button {
    label: String,
    variant: ButtonVariant,
    state: ButtonState,
    interaction: Interaction,
    tracker: PointerTracker,
    enabled: bool,
    background: Animated<Color32>,
    scale: Animated<f32>,
    glow_blur: Animated<f32>,
    glow_opacity: Animated<f32>,
}

impl Button {
    pub fn new(label: impl Into<String>, variant: ButtonVariant) -> Self {
        let rest = targets(ButtonState::Idle, variant);
        Self {
            label: label.into(),
            variant,
            state: ButtonState::Idle,
            interaction: Interaction::default(),
            tracker: PointerTracker::default(),
            enabled: true,
            background: Animated::new(rest.background),
            scale: Animated::new(rest.scale),
            glow_blur: Animated::new(rest.glow_blur),
            glow_opacity: Animated::new(rest.glow_opacity),
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any hover or press and eases back to idle.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.interaction = Interaction::default();
            self.state = ButtonState::Idle;
            self.apply(targets(ButtonState::Idle, self.variant));
        }
    }

    /// Feed one pointer event; returns `true` for a completed click.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        if !self.enabled {
            return false;
        }
        let clicked = self.interaction.apply(event);
        let (next, targets) = transition(self.state, event, self.variant);
        if next != self.state {
            self.state = next;
            self.apply(targets);
        }
        clicked
    }

    fn apply(&mut self, targets: ButtonTargets) {
        ease_to(&mut self.background, targets.background);
        ease_to(&mut self.scale, targets.scale);
        ease_to(&mut self.glow_blur, targets.glow_blur);
        ease_to(&mut self.glow_opacity, targets.glow_opacity);
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let color = self.background.tick(dt);
        let rest = tick_all(
            dt,
            &mut [
                &mut self.scale,
                &mut self.glow_blur,
                &mut self.glow_opacity,
            ],
        );
        color || rest
    }

    pub fn show(&mut self, ui: &mut egui::Ui, size: Vec2) -> bool {
        let sense = if self.enabled {
            Sense::click()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(size, sense);
        let mut clicked = false;
        for event in self.tracker.events(&response) {
            clicked |= self.handle(event);
        }
        if self.enabled {
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
        if self.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter();
        let scaled = Rect::from_center_size(rect.center(), rect.size() * self.scale.get());
        paint_glow(
            painter,
            scaled,
            RADIUS_MEDIUM,
            self.glow_blur.get(),
            self.glow_opacity.get(),
            PALETTE.accent,
        );
        let opacity = if self.enabled { 1.0 } else { 0.5 };
        painter.rect_filled(scaled, RADIUS_MEDIUM, fade(self.background.get(), opacity));
        let text_color = match (self.enabled, self.variant) {
            (false, _) => PALETTE.text_disabled,
            (true, ButtonVariant::Primary) => PALETTE.text_on_accent,
            (true, _) => PALETTE.text_primary,
        };
        painter.text(
            scaled.center(),
            Align2::CENTER_CENTER,
            &self.label,
            FontId::proportional(FONT_BODY * self.scale.get()),
            text_color,
        );
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::FAST;

    #[test]
    fn press_then_leave_resets_without_click() {
        let (state, _) = transition(ButtonState::Idle, PointerEvent::Enter, ButtonVariant::Primary);
        let (state, pressed) = transition(state, PointerEvent::Down, ButtonVariant::Primary);
        assert_eq!(state, ButtonState::Pressed);
        assert_eq!(pressed.scale, PRESSED_SCALE);
        assert_eq!(pressed.background, PALETTE.accent_pressed);
        let (state, idle) = transition(state, PointerEvent::Leave, ButtonVariant::Primary);
        assert_eq!(state, ButtonState::Idle);
        assert_eq!(idle.scale, 1.0);
        assert_eq!(idle.glow_opacity, 0.0);
    }

    #[test]
    fn only_primary_glows() {
        let primary = targets(ButtonState::Hovered, ButtonVariant::Primary);
        assert_eq!((primary.glow_blur, primary.glow_opacity), (GLOW_BLUR, GLOW_OPACITY));
        let ghost = targets(ButtonState::Hovered, ButtonVariant::Ghost);
        assert_eq!(ghost.glow_blur, 0.0);
        assert_eq!(targets(ButtonState::Idle, ButtonVariant::Ghost).background, Color32::TRANSPARENT);
    }

    #[test]
    fn click_fires_on_release_after_press() {
        let mut button = Button::new("PLAY", ButtonVariant::Primary);
        assert!(!button.handle(PointerEvent::Enter));
        assert!(!button.handle(PointerEvent::Down));
        assert!(button.handle(PointerEvent::Up));
        assert_eq!(button.state(), ButtonState::Hovered);
        button.tick(FAST);
        assert_eq!(button.background.get(), PALETTE.accent_hover);
        assert_eq!(button.scale.get(), 1.0);
    }

    #[test]
    fn disabled_button_ignores_pointer() {
        let mut button = Button::new("Install", ButtonVariant::Primary);
        button.handle(PointerEvent::Enter);
        button.set_enabled(false);
        assert_eq!(button.state(), ButtonState::Idle);
        assert!(!button.handle(PointerEvent::Down));
        assert!(!button.handle(PointerEvent::Up));
        button.tick(FAST);
        assert_eq!(button.background.get(), PALETTE.accent);
    }
}
