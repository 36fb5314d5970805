//! Animated controls. Each control splits into a pure `transition` function
//! over an explicit state enum and a stateful wrapper that owns its
//! `Animated` values and paints itself with egui.

use std::time::Duration;

use eframe::egui::{self, Color32, Rect};

use crate::anim::{Animated, Easing, FAST};
use crate::ui::theme::fade;

pub mod button;
pub mod card;
pub mod list_item;
pub mod progress_bar;
pub mod toggle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Down,
    Up,
}

/// Hover and press bookkeeping shared by every clickable control. `Up` only
/// activates after a `Down` on the same control, and `Leave` disarms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interaction {
    pub hovered: bool,
    pub armed: bool,
}

impl Interaction {
    /// Apply `event`; returns `true` when it completes a click.
    pub fn apply(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Enter => {
                self.hovered = true;
                false
            }
            PointerEvent::Leave => {
                self.hovered = false;
                self.armed = false;
                false
            }
            PointerEvent::Down => {
                self.armed = true;
                false
            }
            PointerEvent::Up => std::mem::take(&mut self.armed),
        }
    }
}

/// Turns per-frame egui responses into discrete pointer edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    hovered: bool,
    pressed: bool,
}

impl PointerTracker {
    pub fn events(&mut self, response: &egui::Response) -> Vec<PointerEvent> {
        let hovered = response.hovered();
        let pressed = response.is_pointer_button_down_on();
        self.edges(hovered, pressed)
    }

    fn edges(&mut self, hovered: bool, pressed: bool) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        if hovered && !self.hovered {
            events.push(PointerEvent::Enter);
        }
        if pressed && !self.pressed {
            events.push(PointerEvent::Down);
        }
        if !hovered && self.hovered {
            events.push(PointerEvent::Leave);
        }
        if !pressed && self.pressed {
            events.push(PointerEvent::Up);
        }
        self.hovered = hovered;
        self.pressed = pressed;
        events
    }
}

/// Shared state of cards, version items and nav items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectState {
    #[default]
    Idle,
    Hovered,
    Selected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectEvent {
    Pointer(PointerEvent),
    Selected(bool),
}

/// Selection wins over hover; hover only registers when `hover_enabled`.
/// `hovered` is the pointer state after the event.
#[must_use]
pub fn next_select_state(
    state: SelectState,
    event: SelectEvent,
    hovered: bool,
    hover_enabled: bool,
) -> SelectState {
    let resting = if hovered && hover_enabled {
        SelectState::Hovered
    } else {
        SelectState::Idle
    };
    match event {
        SelectEvent::Selected(true) => SelectState::Selected,
        SelectEvent::Selected(false) => resting,
        SelectEvent::Pointer(_) if state == SelectState::Selected => SelectState::Selected,
        SelectEvent::Pointer(_) => resting,
    }
}

/// Fast ease-out toward `to` unless already heading there.
pub(crate) fn ease_to<T: crate::anim::Lerp>(value: &mut Animated<T>, to: T) {
    if value.target() != to {
        value.animate_to(to, FAST, Easing::QuadOut);
    }
}

/// Frame delta for this pass, capped so a stalled frame cannot skip whole
/// transitions.
pub(crate) fn frame_dt(ui: &egui::Ui) -> Duration {
    let dt = ui.input(|i| i.stable_dt).clamp(0.0, 0.1);
    Duration::from_secs_f32(dt)
}

/// Soft halo approximated by stacked translucent rounded rects.
pub(crate) fn paint_glow(
    painter: &egui::Painter,
    rect: Rect,
    radius: f32,
    blur: f32,
    opacity: f32,
    color: Color32,
) {
    const LAYERS: u8 = 4;
    if blur <= 0.5 || opacity <= 0.01 {
        return;
    }
    for layer in (1..=LAYERS).rev() {
        let spread = blur * f32::from(layer) / f32::from(LAYERS);
        let strength = opacity / f32::from(LAYERS) * (1.0 - f32::from(layer - 1) / f32::from(LAYERS));
        painter.rect_filled(rect.expand(spread), radius + spread, fade(color, strength));
    }
}

pub(crate) fn tick_all(dt: Duration, values: &mut [&mut Animated<f32>]) -> bool {
    let mut running = false;
    for value in values.iter_mut() {
        running |= value.tick(dt);
    }
    running
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_requires_down_on_same_control() {
        let mut interaction = Interaction::default();
        interaction.apply(PointerEvent::Enter);
        assert!(!interaction.apply(PointerEvent::Up));
        interaction.apply(PointerEvent::Down);
        assert!(interaction.apply(PointerEvent::Up));
        assert!(!interaction.apply(PointerEvent::Up));
    }

    #[test]
    fn leaving_disarms_a_press() {
        let mut interaction = Interaction::default();
        interaction.apply(PointerEvent::Enter);
        interaction.apply(PointerEvent::Down);
        interaction.apply(PointerEvent::Leave);
        interaction.apply(PointerEvent::Enter);
        assert!(!interaction.apply(PointerEvent::Up));
    }

    #[test]
    fn tracker_reports_edges_once() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.edges(true, false), vec![PointerEvent::Enter]);
        assert!(tracker.edges(true, false).is_empty());
        assert_eq!(tracker.edges(true, true), vec![PointerEvent::Down]);
        assert_eq!(tracker.edges(false, true), vec![PointerEvent::Leave]);
        assert_eq!(tracker.edges(false, false), vec![PointerEvent::Up]);
    }

    #[test]
    fn selection_beats_hover() {
        let state = next_select_state(
            SelectState::Idle,
            SelectEvent::Pointer(PointerEvent::Enter),
            true,
            true,
        );
        assert_eq!(state, SelectState::Hovered);
        let state = next_select_state(state, SelectEvent::Selected(true), true, true);
        assert_eq!(state, SelectState::Selected);
        let state = next_select_state(
            state,
            SelectEvent::Pointer(PointerEvent::Leave),
            false,
            true,
        );
        assert_eq!(state, SelectState::Selected);
        let state = next_select_state(state, SelectEvent::Selected(false), false, true);
        assert_eq!(state, SelectState::Idle);
    }

    #[test]
    fn hover_can_be_disabled() {
        let state = next_select_state(
            SelectState::Idle,
            SelectEvent::Pointer(PointerEvent::Enter),
            true,
            false,
        );
        assert_eq!(state, SelectState::Idle);
    }
}
