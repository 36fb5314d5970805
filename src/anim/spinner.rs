use std::time::Duration;

use super::{Animated, Easing, Repeat, Tween};

pub const DOTS: usize = 3;
const CYCLE: Duration = Duration::from_millis(900);
const STAGGER: Duration = Duration::from_millis(150);
const PEAK_SCALE: f32 = 1.5;
const PEAK_LIFT: f32 = -5.0;

/// Three bouncing dots. Each dot runs an endless linear phase, offset from
/// its neighbour by a fixed stagger, and maps the phase onto a half sine.
pub struct Spinner {
    phases: [Animated<f32>; DOTS],
    running: bool,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spinner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phases: std::array::from_fn(|_| Animated::new(0.0)),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        for (index, phase) in self.phases.iter_mut().enumerate() {
            let delay = STAGGER * u32::try_from(index).unwrap_or(0);
            phase.start(
                Tween::new(0.0, 1.0, CYCLE)
                    .easing(Easing::Linear)
                    .delay(delay)
                    .repeat(Repeat::Forever),
            );
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        for phase in &mut self.phases {
            phase.set(0.0);
        }
        self.running = false;
    }

    pub fn tick(&mut self, dt: Duration) {
        for phase in &mut self.phases {
            phase.tick(dt);
        }
    }

    /// (scale, vertical lift) of dot `index`.
    pub fn dot(&self, index: usize) -> (f32, f32) {
        let phase = self.phases.get(index).map_or(0.0, Animated::get);
        let bounce = (std::f32::consts::PI * phase).sin().max(0.0);
        (1.0 + (PEAK_SCALE - 1.0) * bounce, PEAK_LIFT * bounce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dots_bounce_in_sequence() {
        let mut spinner = Spinner::new();
        spinner.start();
        spinner.tick(Duration::from_millis(450));

        let (scale, lift) = spinner.dot(0);
        assert!((scale - PEAK_SCALE).abs() < 1e-3);
        assert!((lift - PEAK_LIFT).abs() < 1e-3);
        assert!(spinner.dot(1).0 < scale);
        assert!(spinner.dot(2).0 < spinner.dot(1).0);
    }

    #[test]
    fn stop_rests_every_dot() {
        let mut spinner = Spinner::new();
        spinner.start();
        spinner.tick(Duration::from_millis(300));
        spinner.stop();
        assert!(!spinner.is_running());
        for index in 0..DOTS {
            assert_eq!(spinner.dot(index), (1.0, 0.0));
        }
    }
}
