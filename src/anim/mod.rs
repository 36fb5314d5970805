//! Property tweening driven by the UI frame loop.
//!
//! Every animatable value lives in an [`Animated`] holder that owns at most
//! one [`Tween`]. Starting a new tween replaces the one in flight, starting
//! from whatever value is currently displayed. Nothing here spawns threads;
//! the owner advances time by calling `tick` once per frame.

use std::time::Duration;

use eframe::egui::Color32;

pub mod spinner;
pub mod transition;

/// 100ms, hover and press feedback, exits.
pub const FAST: Duration = Duration::from_millis(100);
/// 200ms, entrances and progress fill.
pub const NORMAL: Duration = Duration::from_millis(200);
/// Completion notification, invoked at most once on the thread calling `tick`.
pub type Callback = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    QuadIn,
    #[default]
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    SineInOut,
}

impl Easing {
    /// Remap normalized time `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    /// Play forward then backward, completing after twice the duration.
    AutoReverse,
    Forever,
}

/// Values that can be interpolated in eased time.
pub trait Lerp: Copy + PartialEq {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Color32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        let channel = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Color32::from_rgba_premultiplied(
            channel(self.r(), to.r()),
            channel(self.g(), to.g()),
            channel(self.b(), to.b()),
            channel(self.a(), to.a()),
        )
    }
}

pub struct Tween<T> {
    from: T,
    to: T,
    duration: Duration,
    delay: Duration,
    easing: Easing,
    repeat: Repeat,
    elapsed: Duration,
    on_complete: Option<Callback>,
}

impl<T: Lerp> Tween<T> {
    #[must_use]
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            easing: Easing::default(),
            repeat: Repeat::Once,
            elapsed: Duration::ZERO,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn from_value(&self) -> T {
        self.from
    }

    pub fn to_value(&self) -> T {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn repeat_mode(&self) -> Repeat {
        self.repeat
    }

    /// Total time until completion, `None` for endless tweens.
    pub fn total(&self) -> Option<Duration> {
        match self.repeat {
            Repeat::Once => Some(self.delay + self.duration),
            Repeat::AutoReverse => Some(self.delay + self.duration * 2),
            Repeat::Forever => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.total().is_some_and(|total| self.elapsed >= total)
    }

    /// Interpolated value at the current elapsed time.
    pub fn value(&self) -> T {
        if self.elapsed < self.delay {
            return self.from;
        }
        let active = (self.elapsed - self.delay).as_secs_f32();
        let span = self.duration.as_secs_f32();
        let progress = if span <= f32::EPSILON {
            match self.repeat {
                Repeat::AutoReverse => 0.0,
                _ => 1.0,
            }
        } else {
            let cycles = active / span;
            match self.repeat {
                Repeat::Once => cycles.min(1.0),
                Repeat::AutoReverse if cycles < 1.0 => cycles,
                Repeat::AutoReverse => (2.0 - cycles).max(0.0),
                Repeat::Forever => cycles.fract(),
            }
        };
        self.from.lerp(self.to, self.easing.apply(progress))
    }

    fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        if let Some(total) = self.total() {
            self.elapsed = self.elapsed.min(total);
        }
    }
}

/// One animatable property. Holds the displayed value and the single tween
/// allowed to drive it.
pub struct Animated<T> {
    value: T,
    tween: Option<Tween<T>>,
    started: u32,
}

impl<T: Lerp> Animated<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            tween: None,
            started: 0,
        }
    }

    /// Currently displayed value.
    pub fn get(&self) -> T {
        self.value
    }

    /// Where the property is heading: the active tween's end value, or the
    /// displayed value when idle. Endless tweens report their end point.
    pub fn target(&self) -> T {
        self.tween.as_ref().map_or(self.value, Tween::to_value)
    }

    /// Set the value immediately, cancelling any tween without firing its
    /// completion.
    pub fn set(&mut self, value: T) {
        self.tween = None;
        self.value = value;
    }

    /// Freeze at the displayed value.
    pub fn stop(&mut self) {
        self.tween = None;
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<&Tween<T>> {
        self.tween.as_ref()
    }

    /// Number of tweens started on this property since creation.
    pub fn started(&self) -> u32 {
        self.started
    }

    /// Replace any in-flight tween with `tween`.
    pub fn start(&mut self, tween: Tween<T>) {
        self.value = tween.value();
        self.tween = Some(tween);
        self.started = self.started.wrapping_add(1);
    }

    /// Animate from the displayed value to `to`.
    pub fn animate_to(&mut self, to: T, duration: Duration, easing: Easing) {
        let tween = Tween::new(self.value, to, duration).easing(easing);
        self.start(tween);
    }

    /// Advance by `dt`. Returns `true` while a tween is still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        tween.advance(dt);
        self.value = tween.value();
        if !tween.is_finished() {
            return true;
        }
        if let Some(mut done) = self.tween.take() {
            self.value = done.value();
            if let Some(callback) = done.on_complete.take() {
                callback();
            }
        }
        false
    }
}

impl<T: Lerp + Default> Default for Animated<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn easing_curves_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicIn,
            Easing::CubicOut,
            Easing::SineInOut,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-5, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{easing:?} at 1");
        }
        assert!(Easing::CubicOut.apply(0.25) > 0.25);
        assert!(Easing::CubicIn.apply(0.25) < 0.25);
        assert!((Easing::SineInOut.apply(0.5) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn interpolates_colors_per_channel() {
        let from = Color32::from_rgb(0, 100, 200);
        let to = Color32::from_rgb(100, 200, 0);
        assert_eq!(from.lerp(to, 0.5), Color32::from_rgb(50, 150, 100));
        assert_eq!(from.lerp(to, 1.0), to);
    }

    #[test]
    fn completes_once_after_delay_and_duration() {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let mut opacity = Animated::new(0.0_f32);
        opacity.start(
            Tween::new(0.0, 1.0, ms(100))
                .delay(ms(50))
                .easing(Easing::Linear)
                .on_complete(move || counter.set(counter.get() + 1)),
        );

        assert!(opacity.tick(ms(50)));
        assert_eq!(opacity.get(), 0.0);
        assert!(opacity.tick(ms(50)));
        assert!((opacity.get() - 0.5).abs() < 1e-4);
        assert!(!opacity.tick(ms(60)));
        assert_eq!(opacity.get(), 1.0);
        assert!(!opacity.tick(ms(60)));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn new_tween_supersedes_in_flight_one() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let mut width = Animated::new(0.0_f32);
        width.start(
            Tween::new(0.0, 100.0, ms(200))
                .easing(Easing::Linear)
                .on_complete(move || flag.set(true)),
        );
        width.tick(ms(100));
        width.animate_to(10.0, ms(100), Easing::Linear);

        assert!((width.tween().map(Tween::from_value).unwrap_or_default() - 50.0).abs() < 1e-3);
        assert_eq!(width.target(), 10.0);
        width.tick(ms(200));
        assert_eq!(width.get(), 10.0);
        assert!(!fired.get());
        assert_eq!(width.started(), 2);
    }

    #[test]
    fn auto_reverse_returns_to_start() {
        let mut blur = Animated::new(8.0_f32);
        blur.start(
            Tween::new(8.0, 15.0, ms(150))
                .easing(Easing::Linear)
                .repeat(Repeat::AutoReverse),
        );
        blur.tick(ms(150));
        assert!((blur.get() - 15.0).abs() < 1e-3);
        assert!(!blur.tick(ms(150)));
        assert_eq!(blur.get(), 8.0);
    }

    #[test]
    fn forever_never_completes() {
        let mut x = Animated::new(0.0_f32);
        x.start(
            Tween::new(-30.0, 100.0, ms(1500))
                .easing(Easing::Linear)
                .repeat(Repeat::Forever),
        );
        assert!(x.tick(ms(4_000)));
        assert!(x.is_animating());
        x.stop();
        assert!(!x.is_animating());
    }

    #[test]
    fn set_cancels_without_completion() {
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let mut thumb = Animated::new(0.0_f32);
        thumb.start(Tween::new(0.0, 20.0, FAST).on_complete(move || flag.set(true)));
        thumb.set(20.0);
        assert!(!thumb.tick(FAST));
        assert_eq!(thumb.get(), 20.0);
        assert!(!fired.get());
    }
}
