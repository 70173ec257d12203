//! Iteration combinator

use verve_core::{Animatable, Completions, Driver, Millis, Step};

/// Replays its child a fixed number of times, or forever.
///
/// In ping-pong mode each odd replay asks the child to reverse, so the value
/// swings back instead of jumping to the origin. Children that cannot
/// reverse, such as sequences and decays, are replayed forward from the
/// original origin; the fallback is logged once.
pub struct Repeat<T: Animatable> {
    child: Box<dyn Driver<T>>,
    iterations: i32,
    completed: i32,
    ping_pong: bool,
    reversible: Option<bool>,
    origin: Option<T>,
    final_value: Option<T>,
}

impl<T: Animatable> Repeat<T> {
    /// Run `child` for `iterations` rounds. Zero finishes immediately with
    /// the value untouched; a negative count repeats forever.
    pub fn new(child: impl Driver<T> + 'static, iterations: i32) -> Self {
        Self {
            child: Box::new(child),
            iterations,
            completed: 0,
            ping_pong: false,
            reversible: None,
            origin: None,
            final_value: None,
        }
    }

    /// Repeat until detached or overwritten.
    pub fn forever(child: impl Driver<T> + 'static) -> Self {
        Self::new(child, -1)
    }

    /// Alternate direction on every other replay.
    pub fn ping_pong(mut self, enabled: bool) -> Self {
        self.ping_pong = enabled;
        self
    }

    /// Reverse the child for an alternate round, remembering a refusal so an
    /// irreversible child is only probed, and warned about, once.
    fn flip_child(&mut self) -> bool {
        if self.reversible == Some(false) {
            return false;
        }
        let flipped = self.child.reverse();
        if self.reversible.is_none() {
            self.reversible = Some(flipped);
            if !flipped {
                tracing::warn!("repeat child cannot reverse, replaying forward instead");
            }
        }
        flipped
    }
}

impl<T: Animatable> Driver<T> for Repeat<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.origin = Some(origin);
        self.completed = 0;
        self.final_value = None;
        if self.iterations != 0 {
            self.child.start(now, origin);
        }
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        let origin = self.origin.expect("repeat stepped before start");
        if let Some(value) = self.final_value {
            return Step::finished(value);
        }
        if self.iterations == 0 {
            self.final_value = Some(origin);
            return Step::finished(origin);
        }

        let step = self.child.step(now, completions);
        if !step.is_finished() {
            return Step::running(step.value);
        }

        if self.iterations > 0 {
            self.completed += 1;
            if self.completed >= self.iterations {
                self.final_value = Some(step.value);
                return Step::finished(step.value);
            }
        }
        if self.ping_pong && self.flip_child() {
            self.child.start(now, step.value);
        } else {
            self.child.start(now, origin);
        }
        // The restarted child samples from the next tick onward.
        Step::running(step.value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decay::{Decay, DecayConfig};
    use crate::easing::Easing;
    use crate::timing::{Timing, TimingConfig};

    fn linear(target: f64, duration: Millis) -> Timing<f64> {
        Timing::new(target, TimingConfig::new(duration).easing(Easing::Linear))
            .expect("valid config")
    }

    #[test]
    fn replays_the_child_the_requested_number_of_times() {
        let mut repeat = Repeat::new(linear(10.0, 100.0), 3);
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        assert_eq!(repeat.step(50.0, &mut completions).value, 5.0);
        // Round one ends, round two restarts from the origin.
        let wrap = repeat.step(100.0, &mut completions);
        assert_eq!(wrap.value, 10.0);
        assert!(!wrap.is_finished());
        assert_eq!(repeat.step(150.0, &mut completions).value, 5.0);
        repeat.step(200.0, &mut completions);
        assert_eq!(repeat.step(250.0, &mut completions).value, 5.0);
        let last = repeat.step(300.0, &mut completions);
        assert!(last.is_finished());
        assert_eq!(last.value, 10.0);
    }

    #[test]
    fn ping_pong_swings_back_instead_of_jumping() {
        let mut repeat = Repeat::new(linear(10.0, 100.0), 2).ping_pong(true);
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        repeat.step(100.0, &mut completions);
        // Second round runs from 10 back toward the original origin.
        let back = repeat.step(150.0, &mut completions);
        assert_eq!(back.value, 5.0);
        let last = repeat.step(200.0, &mut completions);
        assert!(last.is_finished());
        assert_eq!(last.value, 0.0);
    }

    #[test]
    fn irreversible_child_replays_forward() {
        let decay = Decay::new(DecayConfig::new(50.0).clamp(0.0, 5.0)).expect("valid config");
        let mut repeat = Repeat::new(decay, 2).ping_pong(true);
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        let mut reached_bound = 0;
        for frame in 1..600 {
            let step = repeat.step(frame as Millis * (1000.0 / 60.0), &mut completions);
            if step.value == 5.0 {
                reached_bound += 1;
            }
            if step.is_finished() {
                assert_eq!(step.value, 5.0);
                assert!(reached_bound >= 2, "never replayed toward the bound");
                return;
            }
        }
        panic!("repeat never finished");
    }

    #[test]
    fn zero_iterations_finishes_without_moving() {
        let mut repeat = Repeat::new(linear(10.0, 100.0), 0);
        let mut completions = Completions::default();
        repeat.start(0.0, 42.0);
        let step = repeat.step(0.0, &mut completions);
        assert!(step.is_finished());
        assert_eq!(step.value, 42.0);
    }

    #[test]
    fn negative_iterations_never_finish() {
        let mut repeat = Repeat::forever(linear(1.0, 50.0));
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        for frame in 0..500 {
            let step = repeat.step(frame as Millis * 16.0, &mut completions);
            assert!(!step.is_finished(), "finished at frame {frame}");
        }
    }

    #[test]
    fn finished_repeat_reports_the_final_value_forever() {
        let mut repeat = Repeat::new(linear(10.0, 100.0), 1);
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        repeat.step(100.0, &mut completions);
        let later = repeat.step(5000.0, &mut completions);
        assert!(later.is_finished());
        assert_eq!(later.value, 10.0);
    }

    #[test]
    fn child_completion_fires_every_round() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        let child = linear(10.0, 100.0).on_done(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let mut repeat = Repeat::new(child, 3);
        let mut completions = Completions::default();
        repeat.start(0.0, 0.0);
        for now in [100.0, 200.0, 300.0] {
            repeat.step(now, &mut completions);
        }
        for callback in completions.drain() {
            callback();
        }
        // FnOnce callbacks only exist for the first pass.
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
