use std::time::Duration;

use eframe::egui::{self, Color32, CursorIcon, Sense, UiBuilder, Vec2};

use super::{
    Interaction, PointerEvent, PointerTracker, SelectEvent, SelectState, ease_to, frame_dt,
    next_select_state, paint_glow, tick_all,
};
use crate::anim::Animated;
use crate::ui::theme::{PALETTE, RADIUS_LARGE, SPACING_LG};

const SHADOW_BLUR: f32 = 15.0;
const SHADOW_OPACITY: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardFlags {
    pub selectable: bool,
    pub clickable: bool,
    pub hoverable: bool,
    pub has_background: bool,
}

impl Default for CardFlags {
    fn default() -> Self {
        Self {
            selectable: false,
            clickable: false,
            hoverable: true,
            has_background: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardTargets {
    pub background: Color32,
    pub shadow_blur: f32,
    pub shadow_opacity: f32,
}

fn hover_effects(flags: CardFlags) -> bool {
    flags.has_background && flags.hoverable
}

/// The shadow follows the pointer even on a selected card; the fill follows
/// the state.
#[must_use]
pub fn targets(state: SelectState, hovered: bool, flags: CardFlags) -> CardTargets {
    let background = if !flags.has_background {
        Color32::TRANSPARENT
    } else {
        match state {
            SelectState::Selected => PALETTE.surface_selected,
            SelectState::Hovered => PALETTE.surface_hover,
            SelectState::Idle => PALETTE.surface,
        }
    };
    let shadow = hovered && hover_effects(flags);
    CardTargets {
        background,
        shadow_blur: if shadow { SHADOW_BLUR } else { 0.0 },
        shadow_opacity: if shadow { SHADOW_OPACITY } else { 0.0 },
    }
}

#[must_use]
pub fn transition(
    state: SelectState,
    event: SelectEvent,
    hovered: bool,
    flags: CardFlags,
) -> (SelectState, CardTargets) {
    let next = next_select_state(state, event, hovered, hover_effects(flags));
    (next, targets(next, hovered, flags))
}

pub struct Card {
    flags: CardFlags,
    state: SelectState,
    interaction: Interaction,
    tracker: PointerTracker,
    background: Animated<Color32>,
    shadow_blur: Animated<f32>,
    shadow_opacity: Animated<f32>,
}

impl Card {
    pub fn new(flags: CardFlags) -> Self {
        let rest = targets(SelectState::Idle, false, flags);
        Self {
            flags,
            state: SelectState::Idle,
            interaction: Interaction::default(),
            tracker: PointerTracker::default(),
            background: Animated::new(rest.background),
            shadow_blur: Animated::new(rest.shadow_blur),
            shadow_opacity: Animated::new(rest.shadow_opacity),
        }
    }

    pub fn state(&self) -> SelectState {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.state == SelectState::Selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        if self.is_selected() != selected {
            self.dispatch(SelectEvent::Selected(selected));
        }
    }

    /// Feed a pointer event; returns `true` when the card was clicked.
    /// Clicking a selectable card selects it.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        let clicked = self.interaction.apply(event) && (self.flags.clickable || self.flags.selectable);
        self.dispatch(SelectEvent::Pointer(event));
        if clicked && self.flags.selectable {
            self.set_selected(true);
        }
        clicked
    }

    fn dispatch(&mut self, event: SelectEvent) {
        let (next, targets) = transition(self.state, event, self.interaction.hovered, self.flags);
        self.state = next;
        ease_to(&mut self.background, targets.background);
        ease_to(&mut self.shadow_blur, targets.shadow_blur);
        ease_to(&mut self.shadow_opacity, targets.shadow_opacity);
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let color = self.background.tick(dt);
        let rest = tick_all(dt, &mut [&mut self.shadow_blur, &mut self.shadow_opacity]);
        color || rest
    }

    /// Paint the card at `size` and lay `content` out inside it.
    pub fn show(&mut self, ui: &mut egui::Ui, size: Vec2, content: impl FnOnce(&mut egui::Ui)) -> bool {
        let interactive = self.flags.clickable || self.flags.selectable;
        let sense = if interactive {
            Sense::click()
        } else {
            Sense::hover()
        };
        let (rect, response) = ui.allocate_exact_size(size, sense);
        let mut clicked = false;
        for event in self.tracker.events(&response) {
            clicked |= self.handle(event);
        }
        if interactive {
            response.on_hover_cursor(CursorIcon::PointingHand);
        }
        if self.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter();
        paint_glow(
            painter,
            rect,
            RADIUS_LARGE,
            self.shadow_blur.get(),
            self.shadow_opacity.get(),
            Color32::BLACK,
        );
        painter.rect_filled(rect, RADIUS_LARGE, self.background.get());
        let inner = rect.shrink(SPACING_LG);
        ui.scope_builder(UiBuilder::new().max_rect(inner), content);
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::FAST;

    fn selectable() -> CardFlags {
        CardFlags {
            selectable: true,
            clickable: true,
            ..CardFlags::default()
        }
    }

    #[test]
    fn hover_shows_shadow_and_tint() {
        let mut card = Card::new(CardFlags::default());
        card.handle(PointerEvent::Enter);
        card.tick(FAST);
        assert_eq!(card.state(), SelectState::Hovered);
        assert_eq!(card.background.get(), PALETTE.surface_hover);
        assert_eq!(card.shadow_blur.get(), SHADOW_BLUR);
        card.handle(PointerEvent::Leave);
        card.tick(FAST);
        assert_eq!(card.background.get(), PALETTE.surface);
        assert_eq!(card.shadow_opacity.get(), 0.0);
    }

    #[test]
    fn selected_card_keeps_selected_fill_under_hover() {
        let mut card = Card::new(selectable());
        card.handle(PointerEvent::Enter);
        card.handle(PointerEvent::Down);
        assert!(card.handle(PointerEvent::Up));
        assert!(card.is_selected());
        card.tick(FAST);
        assert_eq!(card.background.get(), PALETTE.surface_selected);
        assert_eq!(card.shadow_blur.get(), SHADOW_BLUR);
        card.handle(PointerEvent::Leave);
        card.tick(FAST);
        assert_eq!(card.background.get(), PALETTE.surface_selected);
        assert_eq!(card.shadow_blur.get(), 0.0);
    }

    #[test]
    fn no_hover_effect_without_background() {
        let flags = CardFlags {
            has_background: false,
            ..CardFlags::default()
        };
        let (state, targets) = transition(
            SelectState::Idle,
            SelectEvent::Pointer(PointerEvent::Enter),
            true,
            flags,
        );
        assert_eq!(state, SelectState::Idle);
        assert_eq!(targets.background, Color32::TRANSPARENT);
        assert_eq!(targets.shadow_opacity, 0.0);
    }
}
