//! Page switching for the navigation rail.

use std::time::Duration;

use eframe::egui;

use crate::anim::transition::{Direction, ElementVisual, Switch, TransitionEnd, slide_in};
use crate::ui::controls::list_item::NavItem;
use crate::ui::theme::SPACING_XS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Page {
    Home,
    Versions,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Home, Page::Versions, Page::Settings];

    pub fn index(self) -> usize {
        match self {
            Page::Home => 0,
            Page::Versions => 1,
            Page::Settings => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Versions => "Versions",
            Page::Settings => "Settings",
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            Page::Home => "⌂",
            Page::Versions => "☰",
            Page::Settings => "⚙",
        }
    }
}

/// Outbound and inbound slide directions when moving from `from` to `to`.
#[must_use]
pub fn directions(from: Page, to: Page) -> (Direction, Direction) {
    if to > from {
        (Direction::Up, Direction::Down)
    } else {
        (Direction::Down, Direction::Up)
    }
}

struct InFlight {
    switch: Switch,
    outgoing: Page,
    incoming: Page,
}

/// Owns the page visuals and the rail items. At most one page is visible
/// outside of a switch; during a switch the outgoing page collapses before
/// the incoming one appears.
pub struct Navigator {
    current: Page,
    displayed: Option<Page>,
    pages: [ElementVisual; 3],
    items: [NavItem; 3],
    in_flight: Option<InFlight>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Page::Home,
            displayed: None,
            pages: std::array::from_fn(|_| ElementVisual::collapsed()),
            items: Page::ALL.map(|page| NavItem::new(page.label(), page.glyph())),
            in_flight: None,
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn displayed(&self) -> Option<Page> {
        self.displayed
    }

    pub fn visual(&self, page: Page) -> &ElementVisual {
        &self.pages[page.index()]
    }

    pub fn item(&self, page: Page) -> &NavItem {
        &self.items[page.index()]
    }

    /// First show of the home page.
    pub fn show_initial(&mut self) {
        self.current = Page::Home;
        self.select_item(Page::Home);
        slide_in(Some(&mut self.pages[Page::Home.index()]), Direction::Up, None);
        self.displayed = Some(Page::Home);
    }

    /// Move to `target`. Returns `false` when it is already current.
    pub fn navigate(&mut self, target: Page) -> bool {
        if target == self.current {
            return false;
        }
        let previous = self.current;
        self.current = target;
        self.select_item(target);

        let (outbound, inbound) = directions(previous, target);
        match self.displayed {
            None => {
                slide_in(Some(&mut self.pages[target.index()]), inbound, None);
                self.displayed = Some(target);
            }
            Some(outgoing) => {
                let switch = Switch::begin(&mut self.pages[outgoing.index()], outbound, inbound);
                self.in_flight = Some(InFlight {
                    switch,
                    outgoing,
                    incoming: target,
                });
            }
        }
        true
    }

    fn select_item(&mut self, page: Page) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_selected(index == page.index());
        }
    }

    /// Advance every page visual. Returns `true` while anything moves.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let ends: [Option<TransitionEnd>; 3] = std::array::from_fn(|index| self.pages[index].tick(dt));
        if let Some(flight) = self.in_flight.as_mut() {
            let incoming = &mut self.pages[flight.incoming.index()];
            if flight.switch.advance(ends[flight.outgoing.index()], incoming) {
                self.displayed = Some(flight.incoming);
                self.in_flight = None;
            }
        }
        self.in_flight.is_some() || self.pages.iter().any(ElementVisual::is_animating)
    }

    /// Pages currently taking part in layout.
    pub fn visible_pages(&self) -> impl Iterator<Item = Page> + '_ {
        Page::ALL
            .into_iter()
            .filter(|page| self.pages[page.index()].is_visible())
    }

    /// Draw the rail. Returns the page whose item was clicked.
    pub fn show_rail(&mut self, ui: &mut egui::Ui) -> Option<Page> {
        let mut clicked = None;
        for page in Page::ALL {
            if self.items[page.index()].show(ui) {
                clicked = Some(page);
            }
            ui.add_space(SPACING_XS);
        }
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{FAST, NORMAL};
    use crate::ui::controls::SelectState;

    fn settled() -> Navigator {
        let mut nav = Navigator::new();
        nav.show_initial();
        nav.tick(NORMAL);
        nav
    }

    fn started_counts(nav: &Navigator) -> Vec<u32> {
        Page::ALL
            .iter()
            .flat_map(|page| {
                [
                    nav.visual(*page).opacity.started(),
                    nav.item(*page).background().started(),
                ]
            })
            .collect()
    }

    #[test]
    fn initial_home_slides_up() {
        let mut nav = Navigator::new();
        nav.show_initial();
        let home = nav.visual(Page::Home);
        assert!(home.is_visible());
        assert_eq!(home.offset(), Direction::Up.offset(30.0));
        assert_eq!(nav.item(Page::Home).state(), SelectState::Selected);
        nav.tick(NORMAL);
        assert_eq!(nav.visual(Page::Home).opacity.get(), 1.0);
    }

    #[test]
    fn same_page_is_a_no_op() {
        let mut nav = settled();
        assert!(nav.navigate(Page::Versions));
        nav.tick(FAST);
        nav.tick(NORMAL);
        let before = started_counts(&nav);

        assert!(!nav.navigate(Page::Versions));
        assert!(!nav.tick(Duration::ZERO));
        assert_eq!(started_counts(&nav), before);
        assert_eq!(nav.displayed(), Some(Page::Versions));
    }

    #[test]
    fn moving_forward_slides_up_then_in_from_below() {
        let mut nav = settled();
        nav.navigate(Page::Settings);
        assert_eq!(nav.item(Page::Home).state(), SelectState::Idle);
        assert_eq!(nav.item(Page::Settings).state(), SelectState::Selected);

        nav.tick(Duration::from_millis(50));
        assert!(!nav.visual(Page::Settings).is_visible());
        nav.tick(Duration::from_millis(50));
        assert!(!nav.visual(Page::Home).is_visible());
        let incoming = nav.visual(Page::Settings);
        assert!(incoming.is_visible());
        assert_eq!(incoming.offset(), Direction::Down.offset(30.0));
        assert_eq!(nav.displayed(), Some(Page::Settings));
        assert_eq!(nav.visible_pages().collect::<Vec<_>>(), vec![Page::Settings]);
    }

    #[test]
    fn moving_back_reverses_directions() {
        assert_eq!(directions(Page::Settings, Page::Home), (Direction::Down, Direction::Up));
        assert_eq!(directions(Page::Home, Page::Versions), (Direction::Up, Direction::Down));
    }

    #[test]
    fn no_displayed_page_slides_in_directly() {
        let mut nav = Navigator::new();
        assert!(nav.navigate(Page::Versions));
        assert!(nav.visual(Page::Versions).is_visible());
        assert_eq!(nav.displayed(), Some(Page::Versions));
    }
}
