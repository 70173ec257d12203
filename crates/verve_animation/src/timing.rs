//! Duration-based easing driver

use verve_core::{Animatable, CompletionCallback, Completions, Driver, Millis, Step};

use crate::easing::Easing;
use crate::error::ConfigError;

// ============================================================================
// TimingConfig
// ============================================================================

/// Configuration for a [`Timing`] driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    /// Total duration in milliseconds.
    pub duration: Millis,
    /// Easing applied to linear progress.
    pub easing: Easing,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            duration: 300.0,
            easing: Easing::default(),
        }
    }
}

impl TimingConfig {
    /// Config with the given duration and the default easing.
    pub fn new(duration: Millis) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

// ============================================================================
// Timing
// ============================================================================

/// Interpolates from the attach-time origin to `target` over a fixed
/// duration, shaped by an easing curve.
///
/// The first step after start samples the origin exactly; once elapsed time
/// reaches the duration the driver reports the target exactly and finishes.
pub struct Timing<T: Animatable> {
    target: T,
    config: TimingConfig,
    origin: Option<T>,
    started_at: Millis,
    on_done: Option<CompletionCallback>,
}

impl<T: Animatable> Timing<T> {
    /// Create a timing driver toward `target`.
    ///
    /// Rejects non-finite or negative durations and malformed bezier curves.
    pub fn new(target: T, config: TimingConfig) -> Result<Self, ConfigError> {
        if !config.duration.is_finite() || config.duration < 0.0 {
            return Err(ConfigError::InvalidDuration(config.duration));
        }
        config.easing.validate()?;
        Ok(Self {
            target,
            config,
            origin: None,
            started_at: 0.0,
            on_done: None,
        })
    }

    /// Register a callback to run on the control side once the driver
    /// finishes. Detachment and overwrite never fire it.
    pub fn on_done(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }
}

impl<T: Animatable> Driver<T> for Timing<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.started_at = now;
        self.origin = Some(origin);
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        let origin = self.origin.expect("timing stepped before start");
        let elapsed = now - self.started_at;
        if elapsed >= self.config.duration {
            if let Some(callback) = self.on_done.take() {
                completions.push(callback);
            }
            return Step::finished(self.target);
        }
        let progress = self.config.easing.apply(elapsed / self.config.duration);
        Step::running(origin.lerp(self.target, progress))
    }

    fn reverse(&mut self) -> bool {
        match self.origin {
            Some(origin) => {
                self.target = origin;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn linear(target: f64, duration: Millis) -> Timing<f64> {
        Timing::new(target, TimingConfig::new(duration).easing(Easing::Linear))
            .expect("valid config")
    }

    #[test]
    fn first_step_is_exactly_the_origin() {
        let mut timing = linear(42.0, 250.0);
        let mut completions = Completions::default();
        timing.start(1000.0, 5.0);
        let step = timing.step(1000.0, &mut completions);
        assert_eq!(step.value, 5.0);
        assert!(!step.is_finished());
    }

    #[test]
    fn finishes_on_exactly_the_target() {
        let mut timing = linear(42.0, 250.0);
        let mut completions = Completions::default();
        timing.start(1000.0, 5.0);
        timing.step(1000.0, &mut completions);
        let step = timing.step(1250.0, &mut completions);
        assert_eq!(step.value, 42.0);
        assert!(step.is_finished());
    }

    #[test]
    fn linear_midpoint_is_halfway() {
        let mut timing = linear(100.0, 200.0);
        let mut completions = Completions::default();
        timing.start(0.0, 0.0);
        let step = timing.step(100.0, &mut completions);
        assert_eq!(step.value, 50.0);
    }

    #[test]
    fn completion_fires_once_even_if_stepped_past_the_end() {
        let fired = Arc::new(AtomicUsize::new(0));
        let seen = fired.clone();
        let mut timing = Timing::new(1.0, TimingConfig::new(100.0))
            .expect("valid config")
            .on_done(move || {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        let mut completions = Completions::default();
        timing.start(0.0, 0.0);
        timing.step(150.0, &mut completions);
        timing.step(300.0, &mut completions);
        assert_eq!(completions.len(), 1);
        for callback in completions.drain() {
            callback();
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_duration_finishes_on_the_first_step() {
        let mut timing = linear(7.0, 0.0);
        let mut completions = Completions::default();
        timing.start(500.0, 3.0);
        let step = timing.step(500.0, &mut completions);
        assert!(step.is_finished());
        assert_eq!(step.value, 7.0);
    }

    #[test]
    fn animates_vectors_componentwise() {
        let mut timing = Timing::new([10.0f64, -10.0], TimingConfig::new(100.0).easing(Easing::Linear))
            .expect("valid config");
        let mut completions = Completions::default();
        timing.start(0.0, [0.0, 0.0]);
        let step = timing.step(50.0, &mut completions);
        assert_eq!(step.value, [5.0, -5.0]);
    }

    #[test]
    fn rejects_bad_durations_and_curves() {
        assert!(matches!(
            Timing::new(1.0, TimingConfig::new(-5.0)),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            Timing::new(1.0, TimingConfig::new(f64::NAN)),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert!(matches!(
            Timing::new(1.0, TimingConfig::new(100.0).easing(Easing::CubicBezier(2.0, 0.0, 0.5, 1.0))),
            Err(ConfigError::InvalidBezier { .. })
        ));
    }

    #[test]
    fn reverse_retargets_to_the_origin() {
        let mut timing = linear(100.0, 100.0);
        let mut completions = Completions::default();
        assert!(!timing.reverse());
        timing.start(0.0, 0.0);
        timing.step(0.0, &mut completions);
        assert!(timing.reverse());
        timing.start(100.0, 100.0);
        let step = timing.step(150.0, &mut completions);
        assert_eq!(step.value, 50.0);
    }
}
