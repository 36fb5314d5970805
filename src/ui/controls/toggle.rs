use std::time::Duration;

use eframe::egui::{self, Color32, CursorIcon, Sense, pos2, vec2};

use super::{Interaction, PointerEvent, PointerTracker, ease_to, frame_dt};
use crate::anim::Animated;
use crate::ui::theme::PALETTE;

const TRACK_SIZE: [f32; 2] = [44.0, 24.0];
const THUMB_DIAMETER: f32 = 18.0;
const THUMB_TRAVEL: f32 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Off,
    On,
}

impl ToggleState {
    fn from_bool(on: bool) -> Self {
        if on { ToggleState::On } else { ToggleState::Off }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleEvent {
    Pointer(PointerEvent),
    Flip,
    Set(bool),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToggleTargets {
    pub thumb_x: f32,
    pub track: Color32,
}

/// Hover tints the track only while off.
#[must_use]
pub fn targets(state: ToggleState, hovered: bool) -> ToggleTargets {
    match state {
        ToggleState::On => ToggleTargets {
            thumb_x: THUMB_TRAVEL,
            track: PALETTE.accent,
        },
        ToggleState::Off => ToggleTargets {
            thumb_x: 0.0,
            track: if hovered {
                PALETTE.surface_hover
            } else {
                PALETTE.surface
            },
        },
    }
}

#[must_use]
pub fn transition(state: ToggleState, event: ToggleEvent, hovered: bool) -> (ToggleState, ToggleTargets) {
    let next = match event {
        ToggleEvent::Set(on) => ToggleState::from_bool(on),
        ToggleEvent::Flip => match state {
            ToggleState::On => ToggleState::Off,
            ToggleState::Off => ToggleState::On,
        },
        ToggleEvent::Pointer(_) => state,
    };
    (next, targets(next, hovered))
}

pub struct Toggle {
    state: ToggleState,
    interaction: Interaction,
    tracker: PointerTracker,
    thumb_x: Animated<f32>,
    track: Animated<Color32>,
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Toggle {
    pub fn new(on: bool) -> Self {
        let state = ToggleState::from_bool(on);
        let rest = targets(state, false);
        Self {
            state,
            interaction: Interaction::default(),
            tracker: PointerTracker::default(),
            thumb_x: Animated::new(rest.thumb_x),
            track: Animated::new(rest.track),
        }
    }

    pub fn is_on(&self) -> bool {
        self.state == ToggleState::On
    }

    /// Set without raising a toggle; with `animate` false the visuals snap.
    pub fn set_state(&mut self, on: bool, animate: bool) {
        let (next, targets) = transition(self.state, ToggleEvent::Set(on), self.interaction.hovered);
        self.state = next;
        if animate {
            self.ease(targets);
        } else {
            self.thumb_x.set(targets.thumb_x);
            self.track.set(targets.track);
        }
    }

    /// Animated set. Returns `true`, the toggled notification, only when the
    /// value actually changed.
    pub fn set_on(&mut self, on: bool) -> bool {
        if self.is_on() == on {
            return false;
        }
        self.dispatch(ToggleEvent::Set(on));
        true
    }

    /// Feed a pointer event; a completed click flips the toggle and returns
    /// `true`.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        let clicked = self.interaction.apply(event);
        self.dispatch(ToggleEvent::Pointer(event));
        if clicked {
            self.dispatch(ToggleEvent::Flip);
        }
        clicked
    }

    fn dispatch(&mut self, event: ToggleEvent) {
        let (next, targets) = transition(self.state, event, self.interaction.hovered);
        self.state = next;
        self.ease(targets);
    }

    fn ease(&mut self, targets: ToggleTargets) {
        ease_to(&mut self.thumb_x, targets.thumb_x);
        ease_to(&mut self.track, targets.track);
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let thumb = self.thumb_x.tick(dt);
        let track = self.track.tick(dt);
        thumb || track
    }

    /// Returns the new value when a click toggled it this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<bool> {
        let (rect, response) = ui.allocate_exact_size(vec2(TRACK_SIZE[0], TRACK_SIZE[1]), Sense::click());
        let mut toggled = false;
        for event in self.tracker.events(&response) {
            toggled |= self.handle(event);
        }
        response.on_hover_cursor(CursorIcon::PointingHand);
        if self.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter();
        painter.rect_filled(rect, rect.height() / 2.0, self.track.get());
        let inset = (rect.height() - THUMB_DIAMETER) / 2.0;
        let center = pos2(
            rect.left() + inset + THUMB_DIAMETER / 2.0 + self.thumb_x.get(),
            rect.center().y,
        );
        painter.circle_filled(center + vec2(0.0, 1.0), THUMB_DIAMETER / 2.0, Color32::from_black_alpha(76));
        painter.circle_filled(center, THUMB_DIAMETER / 2.0, Color32::WHITE);
        toggled.then_some(self.is_on())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::FAST;

    #[test]
    fn silent_set_snaps_without_tween() {
        let mut toggle = Toggle::new(false);
        toggle.set_state(true, false);
        assert!(toggle.is_on());
        assert_eq!(toggle.thumb_x.get(), THUMB_TRAVEL);
        assert_eq!(toggle.track.get(), PALETTE.accent);
        assert!(!toggle.thumb_x.is_animating());
        assert_eq!(toggle.thumb_x.started(), 0);
    }

    #[test]
    fn set_on_raises_once_and_animates() {
        let mut toggle = Toggle::new(false);
        assert!(toggle.set_on(true));
        assert!(toggle.thumb_x.is_animating());
        assert!(!toggle.set_on(true));
        assert_eq!(toggle.thumb_x.started(), 1);
        toggle.tick(FAST);
        assert_eq!(toggle.thumb_x.get(), THUMB_TRAVEL);
    }

    #[test]
    fn hover_tints_only_when_off() {
        assert_eq!(targets(ToggleState::Off, true).track, PALETTE.surface_hover);
        assert_eq!(targets(ToggleState::On, true).track, PALETTE.accent);
    }

    #[test]
    fn click_flips_state() {
        let mut toggle = Toggle::new(true);
        toggle.handle(PointerEvent::Enter);
        toggle.handle(PointerEvent::Down);
        assert!(toggle.handle(PointerEvent::Up));
        assert!(!toggle.is_on());
        toggle.tick(FAST);
        assert_eq!(toggle.track.get(), PALETTE.surface_hover);
    }
}
