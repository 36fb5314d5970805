use std::time::Duration;

use eframe::egui::{self, Rect, Sense, pos2, vec2};

use super::{frame_dt, paint_glow, tick_all};
use crate::anim::{Animated, Easing, NORMAL, Repeat, Tween};
use crate::ui::theme::PALETTE;

const HEIGHT: f32 = 6.0;
const GLOW_REST: f32 = 8.0;
const GLOW_PULSE: f32 = 15.0;
const GLOW_COMPLETE: f32 = 25.0;
const GLOW_OPACITY: f32 = 0.5;
const PULSE: Duration = Duration::from_millis(150);
const COMPLETE_FILL: Duration = Duration::from_millis(300);
const COMPLETE_PULSE: Duration = Duration::from_millis(200);
const SWEEP: Duration = Duration::from_millis(1500);
const SWEEP_FRACTION: f32 = 0.3;

/// Fill width for `value` percent of `track_width`, clamped to the track.
#[must_use]
pub fn target_width(track_width: f32, value: f32) -> f32 {
    track_width * value.clamp(0.0, 100.0) / 100.0
}

/// Determinate fill with a glow, or an endless sweep when indeterminate.
/// The sweep and the width tween never run together.
pub struct ProgressBar {
    value: f32,
    indeterminate: bool,
    track_width: f32,
    width: Animated<f32>,
    sweep_x: Animated<f32>,
    glow_blur: Animated<f32>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressBar {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: 0.0,
            indeterminate: false,
            track_width: 0.0,
            width: Animated::new(0.0),
            sweep_x: Animated::new(0.0),
            glow_blur: Animated::new(GLOW_REST),
        }
    }

    /// Logical value in `[0, 100]`, independent of the animated fill.
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    pub fn width(&self) -> &Animated<f32> {
        &self.width
    }

    pub fn sweep(&self) -> &Animated<f32> {
        &self.sweep_x
    }

    pub fn glow(&self) -> &Animated<f32> {
        &self.glow_blur
    }

    /// Track width changes snap the fill to the current value.
    pub fn set_track_width(&mut self, track_width: f32) {
        if (self.track_width - track_width).abs() < f32::EPSILON {
            return;
        }
        self.track_width = track_width.max(0.0);
        if self.indeterminate {
            self.start_sweep();
        } else {
            self.width.set(target_width(self.track_width, self.value));
        }
    }

    /// Animate toward `value` and pulse the glow while partially filled.
    pub fn set_value(&mut self, value: f32) {
        if self.set_progress(value, None) && self.value > 0.0 && self.value < 100.0 {
            self.glow_blur.start(
                Tween::new(GLOW_REST, GLOW_PULSE, PULSE)
                    .easing(Easing::QuadInOut)
                    .repeat(Repeat::AutoReverse),
            );
        }
    }

    /// Store `value` and tween the fill over `duration` (200ms by default).
    /// Returns whether a width tween was started; nothing animates while
    /// indeterminate or before the track has a width.
    pub fn set_progress(&mut self, value: f32, duration: Option<Duration>) -> bool {
        self.value = value.clamp(0.0, 100.0);
        if self.indeterminate || self.track_width <= 0.0 {
            return false;
        }
        let target = target_width(self.track_width, self.value);
        self.width.start(
            Tween::new(self.width.get(), target, duration.unwrap_or(NORMAL)).easing(Easing::QuadOut),
        );
        true
    }

    pub fn complete(&mut self) {
        self.set_progress(100.0, Some(COMPLETE_FILL));
        self.glow_blur.start(
            Tween::new(GLOW_REST, GLOW_COMPLETE, COMPLETE_PULSE)
                .easing(Easing::QuadInOut)
                .repeat(Repeat::AutoReverse),
        );
    }

    pub fn set_indeterminate(&mut self, indeterminate: bool) {
        if self.indeterminate == indeterminate {
            return;
        }
        self.indeterminate = indeterminate;
        if indeterminate {
            self.start_sweep();
        } else {
            self.sweep_x.set(0.0);
            self.width.set(0.0);
        }
    }

    /// Back to an empty determinate bar.
    pub fn reset(&mut self) {
        self.set_indeterminate(false);
        self.value = 0.0;
        self.width.set(0.0);
        self.glow_blur.set(GLOW_REST);
    }

    fn start_sweep(&mut self) {
        let sweep_width = self.track_width * SWEEP_FRACTION;
        self.width.set(sweep_width);
        self.sweep_x.start(
            Tween::new(-sweep_width, self.track_width, SWEEP)
                .easing(Easing::SineInOut)
                .repeat(Repeat::Forever),
        );
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        tick_all(
            dt,
            &mut [&mut self.width, &mut self.sweep_x, &mut self.glow_blur],
        )
    }

    pub fn show(&mut self, ui: &mut egui::Ui, width: f32) {
        let (rect, _) = ui.allocate_exact_size(vec2(width, HEIGHT), Sense::hover());
        self.set_track_width(rect.width());
        if self.tick(frame_dt(ui)) {
            ui.ctx().request_repaint();
        }

        let radius = HEIGHT / 2.0;
        let painter = ui.painter();
        painter.rect_filled(rect, radius, PALETTE.surface);

        let left = if self.indeterminate {
            rect.left() + self.sweep_x.get()
        } else {
            rect.left()
        };
        let fill = Rect::from_min_max(
            pos2(left, rect.top()),
            pos2(left + self.width.get(), rect.bottom()),
        )
        .intersect(rect);
        if fill.width() <= 0.0 {
            return;
        }
        let clipped = painter.with_clip_rect(rect.expand(GLOW_COMPLETE));
        paint_glow(&clipped, fill, radius, self.glow_blur.get(), GLOW_OPACITY, PALETTE.accent);
        painter.rect_filled(fill, radius, PALETTE.accent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: f32 = 300.0;

    fn bar() -> ProgressBar {
        let mut bar = ProgressBar::new();
        bar.set_track_width(TRACK);
        bar
    }

    #[test]
    fn width_targets_are_clamped() {
        let mut bar = bar();
        bar.set_value(50.0);
        assert_eq!(bar.width().target(), 150.0);
        bar.set_value(150.0);
        assert_eq!(bar.value(), 100.0);
        assert_eq!(bar.width().target(), TRACK);
        bar.set_value(-10.0);
        assert_eq!(bar.value(), 0.0);
        assert_eq!(bar.width().target(), 0.0);
    }

    #[test]
    fn partial_values_pulse_the_glow() {
        let mut bar = bar();
        bar.set_value(100.0);
        assert_eq!(bar.glow().started(), 0);
        bar.set_value(40.0);
        assert_eq!(bar.glow().target(), GLOW_PULSE);
        bar.tick(PULSE * 2);
        assert_eq!(bar.glow().get(), GLOW_REST);
    }

    #[test]
    fn indeterminate_replaces_width_tween() {
        let mut bar = bar();
        bar.set_value(60.0);
        assert!(bar.width().is_animating());

        bar.set_indeterminate(true);
        assert!(!bar.width().is_animating());
        assert_eq!(bar.width().get(), TRACK * SWEEP_FRACTION);
        let sweep = bar.sweep().tween().map(|t| (t.from_value(), t.to_value(), t.repeat_mode()));
        assert_eq!(sweep, Some((-TRACK * SWEEP_FRACTION, TRACK, Repeat::Forever)));

        bar.set_value(80.0);
        assert!(!bar.width().is_animating());

        bar.set_indeterminate(false);
        assert!(!bar.sweep().is_animating());
        assert_eq!(bar.width().get(), 0.0);
    }

    #[test]
    fn enabling_indeterminate_twice_keeps_the_sweep() {
        let mut bar = bar();
        bar.set_indeterminate(true);
        bar.tick(Duration::from_millis(500));
        let position = bar.sweep().get();
        bar.set_indeterminate(true);
        assert_eq!(bar.sweep().get(), position);
        assert_eq!(bar.sweep().started(), 1);
    }

    #[test]
    fn complete_fills_over_longer_duration() {
        let mut bar = bar();
        bar.complete();
        assert_eq!(bar.width().tween().map(Tween::duration), Some(COMPLETE_FILL));
        assert_eq!(bar.glow().target(), GLOW_COMPLETE);
        bar.tick(COMPLETE_FILL);
        assert_eq!(bar.width().get(), TRACK);
    }

    #[test]
    fn zero_track_width_skips_tweens() {
        let mut bar = ProgressBar::new();
        bar.set_value(42.0);
        assert_eq!(bar.width().started(), 0);
        bar.set_track_width(TRACK);
        assert_eq!(bar.width().get(), target_width(TRACK, 42.0));
    }
}
