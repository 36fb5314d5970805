//! Slide, fade and scale effects composed from per-property tweens.
//!
//! Entry points take `Option<&mut ElementVisual>` and silently do nothing
//! when the target is missing. Re-running a transition on an element that is
//! mid-flight overrides the affected properties; the superseded completion
//! never fires.

use std::time::Duration;

use super::{Animated, Callback, Easing, FAST, NORMAL, Tween};

/// Offset used by page slides.
pub const SLIDE_OFFSET: f32 = 30.0;
/// Offset used by staggered list entrances.
pub const STAGGER_OFFSET: f32 = 20.0;
/// Starting scale for scale-in, ending scale for scale-out.
pub const SCALE_FROM: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Signed (x, y) offset of the given magnitude.
    #[must_use]
    pub fn offset(self, magnitude: f32) -> (f32, f32) {
        match self {
            Direction::Right => (magnitude, 0.0),
            Direction::Left => (-magnitude, 0.0),
            Direction::Up => (0.0, -magnitude),
            Direction::Down => (0.0, magnitude),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Removed from layout, not merely transparent.
    Collapsed,
}

/// Reported by [`ElementVisual::tick`] when a transition's opacity tween ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEnd {
    Shown,
    Collapsed,
}

pub struct Translate {
    pub x: Animated<f32>,
    pub y: Animated<f32>,
}

impl Translate {
    fn at(x: f32, y: f32) -> Self {
        Self {
            x: Animated::new(x),
            y: Animated::new(y),
        }
    }
}

struct Pending {
    collapse: bool,
    on_complete: Option<Callback>,
}

/// Render-side state of one element: visibility, opacity and an optional
/// translate or scale transform. A new transform kind replaces the old one,
/// mirroring a single render transform slot.
pub struct ElementVisual {
    visibility: Visibility,
    pub opacity: Animated<f32>,
    translate: Option<Translate>,
    scale: Option<Animated<f32>>,
    pending: Option<Pending>,
}

impl Default for ElementVisual {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementVisual {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visibility: Visibility::Visible,
            opacity: Animated::new(1.0),
            translate: None,
            scale: None,
            pending: None,
        }
    }

    #[must_use]
    pub fn collapsed() -> Self {
        let mut element = Self::new();
        element.visibility = Visibility::Collapsed;
        element.opacity.set(0.0);
        element
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Current (x, y) translation, zero without a translate transform.
    pub fn offset(&self) -> (f32, f32) {
        self.translate
            .as_ref()
            .map_or((0.0, 0.0), |t| (t.x.get(), t.y.get()))
    }

    pub fn translate(&self) -> Option<&Translate> {
        self.translate.as_ref()
    }

    /// Current uniform scale about the element's center.
    pub fn scale(&self) -> f32 {
        self.scale.as_ref().map_or(1.0, Animated::get)
    }

    pub fn is_animating(&self) -> bool {
        self.opacity.is_animating()
            || self
                .translate
                .as_ref()
                .is_some_and(|t| t.x.is_animating() || t.y.is_animating())
            || self.scale.as_ref().is_some_and(Animated::is_animating)
    }

    /// Advance every property; resolves the pending completion once the
    /// opacity tween has finished.
    pub fn tick(&mut self, dt: Duration) -> Option<TransitionEnd> {
        if let Some(translate) = self.translate.as_mut() {
            translate.x.tick(dt);
            translate.y.tick(dt);
        }
        if let Some(scale) = self.scale.as_mut() {
            scale.tick(dt);
        }
        self.opacity.tick(dt);
        if self.opacity.is_animating() {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.collapse {
            self.visibility = Visibility::Collapsed;
        }
        if let Some(callback) = pending.on_complete {
            callback();
        }
        Some(if pending.collapse {
            TransitionEnd::Collapsed
        } else {
            TransitionEnd::Shown
        })
    }

    fn settle(&mut self, collapse: bool, on_complete: Option<Callback>) {
        self.pending = Some(Pending {
            collapse,
            on_complete,
        });
    }

    fn translate_mut(&mut self) -> &mut Translate {
        self.scale = None;
        self.translate.get_or_insert_with(|| Translate::at(0.0, 0.0))
    }

    fn scale_mut(&mut self, initial: f32) -> &mut Animated<f32> {
        self.translate = None;
        self.scale.get_or_insert_with(|| Animated::new(initial))
    }
}

/// Show `element`, sliding it from the `direction` side into place while
/// fading in.
pub fn slide_in(element: Option<&mut ElementVisual>, direction: Direction, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    element.visibility = Visibility::Visible;
    let (start_x, start_y) = direction.offset(SLIDE_OFFSET);
    element.translate = None;
    let translate = element.translate_mut();
    translate.x.start(Tween::new(start_x, 0.0, NORMAL).easing(Easing::CubicOut));
    translate.y.start(Tween::new(start_y, 0.0, NORMAL).easing(Easing::CubicOut));
    element
        .opacity
        .start(Tween::new(0.0, 1.0, NORMAL).easing(Easing::CubicOut));
    element.settle(false, on_complete);
}

/// Slide `element` toward `direction` while fading out, then collapse it.
pub fn slide_out(element: Option<&mut ElementVisual>, direction: Direction, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    let (end_x, end_y) = direction.offset(SLIDE_OFFSET);
    let translate = element.translate_mut();
    translate.x.animate_to(end_x, FAST, Easing::CubicIn);
    translate.y.animate_to(end_y, FAST, Easing::CubicIn);
    element.opacity.animate_to(0.0, FAST, Easing::CubicIn);
    element.settle(true, on_complete);
}

pub fn fade_in(element: Option<&mut ElementVisual>, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    element.visibility = Visibility::Visible;
    element
        .opacity
        .start(Tween::new(0.0, 1.0, NORMAL).easing(Easing::QuadOut));
    element.settle(false, on_complete);
}

/// Like [`fade_in`] but holding at zero opacity for `delay` first.
pub fn fade_in_after(element: Option<&mut ElementVisual>, delay: Duration) {
    let Some(element) = element else {
        return;
    };
    element.visibility = Visibility::Visible;
    element.opacity.start(
        Tween::new(0.0, 1.0, NORMAL)
            .easing(Easing::QuadOut)
            .delay(delay),
    );
    element.settle(false, None);
}

pub fn fade_out(element: Option<&mut ElementVisual>, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    element.opacity.animate_to(0.0, FAST, Easing::QuadIn);
    element.settle(true, on_complete);
}

pub fn scale_in(element: Option<&mut ElementVisual>, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    element.visibility = Visibility::Visible;
    element.scale = None;
    element
        .scale_mut(SCALE_FROM)
        .start(Tween::new(SCALE_FROM, 1.0, NORMAL).easing(Easing::CubicOut));
    element
        .opacity
        .start(Tween::new(0.0, 1.0, NORMAL).easing(Easing::QuadOut));
    element.settle(false, on_complete);
}

pub fn scale_out(element: Option<&mut ElementVisual>, on_complete: Option<Callback>) {
    let Some(element) = element else {
        return;
    };
    element
        .scale_mut(1.0)
        .animate_to(SCALE_FROM, FAST, Easing::CubicIn);
    element.opacity.animate_to(0.0, FAST, Easing::QuadIn);
    element.settle(true, on_complete);
}

/// Bring `elements` in one after another, each delayed by
/// `index * per_element_delay` from a common start. Every element starts
/// 20px below its resting place whatever the direction.
pub fn stagger_slide_in(elements: &mut [ElementVisual], _direction: Direction, per_element_delay: Duration) {
    for (index, element) in elements.iter_mut().enumerate() {
        let delay = per_element_delay * u32::try_from(index).unwrap_or(u32::MAX);
        element.visibility = Visibility::Visible;
        element.translate = None;
        let translate = element.translate_mut();
        translate.y.start(
            Tween::new(STAGGER_OFFSET, 0.0, NORMAL)
                .easing(Easing::CubicOut)
                .delay(delay),
        );
        element.opacity.start(
            Tween::new(0.0, 1.0, NORMAL)
                .easing(Easing::QuadOut)
                .delay(delay),
        );
        element.settle(false, None);
    }
}

/// Sequential out-then-in transition between two elements. The inbound slide
/// starts only once the outbound one has collapsed its element.
pub struct Switch {
    inbound: Direction,
    started: bool,
}

impl Switch {
    /// Start sliding `outgoing` toward `outbound`.
    pub fn begin(outgoing: &mut ElementVisual, outbound: Direction, inbound: Direction) -> Self {
        slide_out(Some(outgoing), outbound, None);
        Self {
            inbound,
            started: false,
        }
    }

    /// Slide `outgoing` out to the left, then bring `incoming` in from
    /// `direction`.
    pub fn fade(outgoing: &mut ElementVisual, direction: Direction) -> Self {
        Self::begin(outgoing, Direction::Left, direction)
    }

    pub fn inbound(&self) -> Direction {
        self.inbound
    }

    /// Feed the outgoing element's tick result. Starts the inbound slide on
    /// `incoming` when the outbound slide has ended; returns `true` once the
    /// inbound slide is running.
    pub fn advance(&mut self, outgoing_end: Option<TransitionEnd>, incoming: &mut ElementVisual) -> bool {
        if !self.started && outgoing_end == Some(TransitionEnd::Collapsed) {
            slide_in(Some(incoming), self.inbound, None);
            self.started = true;
        }
        self.started
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, Box::new(move || handle.set(handle.get() + 1)))
    }

    #[test]
    fn direction_offsets_are_signed() {
        assert_eq!(Direction::Right.offset(30.0), (30.0, 0.0));
        assert_eq!(Direction::Left.offset(30.0), (-30.0, 0.0));
        assert_eq!(Direction::Up.offset(30.0), (0.0, -30.0));
        assert_eq!(Direction::Down.offset(30.0), (0.0, 30.0));
    }

    #[test]
    fn slide_out_collapses_and_slide_in_restores() {
        for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            let mut element = ElementVisual::new();
            let (done, callback) = counter();
            slide_out(Some(&mut element), direction, Some(callback));
            assert!(element.is_visible());
            assert_eq!(element.tick(FAST), Some(TransitionEnd::Collapsed));
            assert!(!element.is_visible());
            assert_eq!(done.get(), 1);
            assert_eq!(element.offset(), direction.offset(SLIDE_OFFSET));

            slide_in(Some(&mut element), direction, None);
            assert!(element.is_visible());
            assert_eq!(element.opacity.get(), 0.0);
            assert_eq!(element.opacity.target(), 1.0);
            assert_eq!(element.offset(), direction.offset(SLIDE_OFFSET));
            assert_eq!(element.tick(NORMAL), Some(TransitionEnd::Shown));
            assert_eq!(element.opacity.get(), 1.0);
            assert_eq!(element.offset(), (0.0, 0.0));
        }
    }

    #[test]
    fn slide_out_seeds_translate_at_origin() {
        let mut element = ElementVisual::new();
        assert!(element.translate().is_none());
        slide_out(Some(&mut element), Direction::Up, None);
        let translate = element.translate().map(|t| (t.y.get(), t.y.target()));
        assert_eq!(translate, Some((0.0, -SLIDE_OFFSET)));
    }

    #[test]
    fn missing_target_is_ignored() {
        let (done, callback) = counter();
        slide_in(None, Direction::Up, Some(callback));
        slide_out(None, Direction::Up, None);
        fade_in(None, None);
        fade_out(None, None);
        scale_in(None, None);
        scale_out(None, None);
        assert_eq!(done.get(), 0);
    }

    #[test]
    fn restarting_overrides_pending_completion() {
        let mut element = ElementVisual::new();
        let (out_done, out_callback) = counter();
        slide_out(Some(&mut element), Direction::Left, Some(out_callback));
        element.tick(Duration::from_millis(50));
        slide_in(Some(&mut element), Direction::Right, None);
        element.tick(NORMAL);
        assert_eq!(out_done.get(), 0);
        assert!(element.is_visible());
    }

    #[test]
    fn scale_transitions_pair_with_fade() {
        let mut element = ElementVisual::collapsed();
        scale_in(Some(&mut element), None);
        assert_eq!(element.scale(), SCALE_FROM);
        element.tick(NORMAL);
        assert_eq!(element.scale(), 1.0);
        scale_out(Some(&mut element), None);
        assert_eq!(element.tick(FAST), Some(TransitionEnd::Collapsed));
        assert!((element.scale() - SCALE_FROM).abs() < 1e-5);
    }

    #[test]
    fn stagger_delays_each_element() {
        let mut items: Vec<ElementVisual> = (0..3).map(|_| ElementVisual::collapsed()).collect();
        stagger_slide_in(&mut items, Direction::Up, Duration::from_millis(50));
        for item in &mut items {
            assert!(item.is_visible());
            assert_eq!(item.offset(), (0.0, STAGGER_OFFSET));
            item.tick(NORMAL);
        }
        assert_eq!(items[0].opacity.get(), 1.0);
        assert!(items[1].opacity.get() < 1.0);
        assert!(items[2].opacity.get() < items[1].opacity.get());
        assert_eq!(items[2].tick(Duration::from_millis(100)), Some(TransitionEnd::Shown));
    }

    #[test]
    fn switch_is_strictly_sequential() {
        let mut outgoing = ElementVisual::new();
        let mut incoming = ElementVisual::collapsed();
        let mut switch = Switch::fade(&mut outgoing, Direction::Right);

        let end = outgoing.tick(Duration::from_millis(60));
        assert!(!switch.advance(end, &mut incoming));
        assert!(!incoming.is_visible());

        let end = outgoing.tick(Duration::from_millis(40));
        assert!(switch.advance(end, &mut incoming));
        assert!(incoming.is_visible());
        assert_eq!(incoming.offset(), (SLIDE_OFFSET, 0.0));
        assert_eq!(switch.inbound(), Direction::Right);
    }
}
