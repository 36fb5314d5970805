//! Rows of the version list and the navigation rail. Both share the
//! idle/hovered/selected machine; only the fills differ.

use std::time::Duration;

use eframe::egui::{self, Align2, Color32, CursorIcon, FontId, Rect, Sense, pos2, vec2};

use super::{
    Interaction, PointerEvent, PointerTracker, SelectEvent, SelectState, ease_to, frame_dt,
    next_select_state,
};
use crate::anim::Animated;
use crate::anim::transition::ElementVisual;
use crate::ui::theme::{
    FONT_BODY, FONT_MEDIUM, NAV_ITEM_HEIGHT, PALETTE, RADIUS_MEDIUM, RADIUS_SMALL, SPACING_LG,
    SPACING_MD, SPACING_SM, fade, tint,
};

const VERSION_ROW_HEIGHT: f32 = 44.0;
const INSTALLED_GREEN: Color32 = Color32::from_rgb(76, 175, 80);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Version,
    Nav,
}

#[must_use]
pub fn background(kind: ItemKind, state: SelectState) -> Color32 {
    match (kind, state) {
        (_, SelectState::Idle) => Color32::TRANSPARENT,
        (_, SelectState::Hovered) => PALETTE.surface_hover,
        (ItemKind::Version, SelectState::Selected) => PALETTE.surface_selected,
        (ItemKind::Nav, SelectState::Selected) => PALETTE.surface_hover,
    }
}

#[must_use]
pub fn transition(
    kind: ItemKind,
    state: SelectState,
    event: SelectEvent,
    hovered: bool,
) -> (SelectState, Color32) {
    let next = next_select_state(state, event, hovered, true);
    (next, background(kind, next))
}

/// Selection machinery shared by both row kinds.
struct Selectable {
    kind: ItemKind,
    state: SelectState,
    interaction: Interaction,
    tracker: PointerTracker,
    background: Animated<Color32>,
}

impl Selectable {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            state: SelectState::Idle,
            interaction: Interaction::default(),
            tracker: PointerTracker::default(),
            background: Animated::new(Color32::TRANSPARENT),
        }
    }

    fn dispatch(&mut self, event: SelectEvent) {
        let (next, color) = transition(self.kind, self.state, event, self.interaction.hovered);
        self.state = next;
        ease_to(&mut self.background, color);
    }

    fn set_selected(&mut self, selected: bool) {
        if (self.state == SelectState::Selected) != selected {
            self.dispatch(SelectEvent::Selected(selected));
        }
    }

    /// Returns `true` when the row was clicked. Clicking does not select;
    /// the owner decides.
    fn handle(&mut self, event: PointerEvent) -> bool {
        let clicked = self.interaction.apply(event);
        self.dispatch(SelectEvent::Pointer(event));
        clicked
    }

    fn interact(&mut self, ui: &mut egui::Ui, rect: Rect, id: egui::Id) -> bool {
        let response = ui.interact(rect, id, Sense::click());
        let mut clicked = false;
        for event in self.tracker.events(&response) {
            clicked |= self.handle(event);
        }
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

pub struct VersionItem {
    pub version: String,
    pub latest: bool,
    pub installed: bool,
    pub visual: ElementVisual,
    inner: Selectable,
}

impl VersionItem {
    pub fn new(version: impl Into<String>, latest: bool, installed: bool) -> Self {
        Self {
            version: version.into(),
            latest,
            installed,
            visual: ElementVisual::collapsed(),
            inner: Selectable::new(ItemKind::Version),
        }
    }

    pub fn state(&self) -> SelectState {
        self.inner.state
    }

    pub fn is_selected(&self) -> bool {
        self.inner.state == SelectState::Selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.inner.set_selected(selected);
    }

    pub fn handle(&mut self, event: PointerEvent) -> bool {
        self.inner.handle(event)
    }

    pub fn background(&self) -> Color32 {
        self.inner.background.get()
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let background = self.inner.background.tick(dt);
        self.visual.tick(dt);
        background || self.visual.is_animating()
    }

    /// Returns `true` when clicked. Collapsed rows take no space.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        if !self.visual.is_visible() {
            return false;
        }
        if self.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }
        let (slot, _) = ui.allocate_exact_size(vec2(ui.available_width(), VERSION_ROW_HEIGHT), Sense::hover());
        let (dx, dy) = self.visual.offset();
        let rect = slot.translate(vec2(dx, dy));
        let id = ui.id().with(("version", &self.version));
        let clicked = self.inner.interact(ui, rect, id);

        let opacity = self.visual.opacity.get();
        let painter = ui.painter();
        painter.rect_filled(rect, RADIUS_MEDIUM, fade(self.background(), opacity));
        painter.text(
            pos2(rect.left() + SPACING_LG, rect.center().y),
            Align2::LEFT_CENTER,
            &self.version,
            FontId::proportional(FONT_MEDIUM),
            fade(PALETTE.text_primary, opacity),
        );

        let badge = if self.installed {
            Some(("INSTALLED", INSTALLED_GREEN))
        } else if self.latest {
            Some(("LATEST", PALETTE.accent))
        } else {
            None
        };
        let right = pos2(rect.right() - SPACING_LG, rect.center().y);
        match badge {
            Some((label, color)) => {
                let galley = painter.layout_no_wrap(
                    label.to_owned(),
                    FontId::proportional(10.0),
                    fade(color, opacity),
                );
                let size = galley.size() + vec2(SPACING_SM * 2.0, 4.0);
                let badge_rect = Rect::from_min_size(
                    pos2(right.x - size.x, right.y - size.y / 2.0),
                    size,
                );
                painter.rect_filled(badge_rect, RADIUS_SMALL, fade(tint(color, 25), opacity));
                painter.galley(
                    badge_rect.center() - galley.size() / 2.0,
                    galley,
                    fade(color, opacity),
                );
            }
            None => {
                painter.text(
                    right,
                    Align2::RIGHT_CENTER,
                    "⬇",
                    FontId::proportional(FONT_BODY),
                    fade(PALETTE.text_disabled, opacity),
                );
            }
        }
        clicked
    }
}

pub struct NavItem {
    pub label: &'static str,
    pub glyph: &'static str,
    inner: Selectable,
}

impl NavItem {
    pub fn new(label: &'static str, glyph: &'static str) -> Self {
        Self {
            label,
            glyph,
            inner: Selectable::new(ItemKind::Nav),
        }
    }

    pub fn state(&self) -> SelectState {
        self.inner.state
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.inner.set_selected(selected);
    }

    pub fn handle(&mut self, event: PointerEvent) -> bool {
        self.inner.handle(event)
    }

    pub fn background(&self) -> &Animated<Color32> {
        &self.inner.background
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let (rect, _) = ui.allocate_exact_size(vec2(ui.available_width(), NAV_ITEM_HEIGHT), Sense::hover());
        let id = ui.id().with(("nav", self.label));
        let clicked = self.inner.interact(ui, rect, id);
        if self.inner.background.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }
        let text = if self.inner.state == SelectState::Selected {
            PALETTE.text_primary
        } else {
            PALETTE.text_secondary
        };
        let painter = ui.painter();
        painter.rect_filled(rect, RADIUS_MEDIUM, self.inner.background.get());
        painter.text(
            pos2(rect.left() + SPACING_MD, rect.center().y),
            Align2::LEFT_CENTER,
            self.glyph,
            FontId::proportional(FONT_MEDIUM),
            text,
        );
        painter.text(
            pos2(rect.left() + SPACING_MD + 28.0, rect.center().y),
            Align2::LEFT_CENTER,
            self.label,
            FontId::proportional(FONT_BODY),
            text,
        );
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::FAST;

    #[test]
    fn version_item_hover_is_suppressed_while_selected() {
        let mut item = VersionItem::new("1.21.50", true, false);
        item.set_selected(true);
        item.handle(PointerEvent::Enter);
        assert_eq!(item.state(), SelectState::Selected);
        item.tick(FAST);
        assert_eq!(item.background(), PALETTE.surface_selected);
        item.set_selected(false);
        assert_eq!(item.state(), SelectState::Hovered);
    }

    #[test]
    fn click_reports_without_selecting() {
        let mut item = VersionItem::new("1.21.40", false, true);
        item.handle(PointerEvent::Enter);
        item.handle(PointerEvent::Down);
        assert!(item.handle(PointerEvent::Up));
        assert!(!item.is_selected());
    }

    #[test]
    fn nav_selection_uses_hover_fill() {
        assert_eq!(background(ItemKind::Nav, SelectState::Selected), PALETTE.surface_hover);
        assert_eq!(background(ItemKind::Version, SelectState::Selected), PALETTE.surface_selected);
        let mut nav = NavItem::new("Home", "⌂");
        nav.set_selected(true);
        assert_eq!(nav.background().target(), PALETTE.surface_hover);
        nav.handle(PointerEvent::Leave);
        assert_eq!(nav.state(), SelectState::Selected);
    }
}
