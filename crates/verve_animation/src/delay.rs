//! Deferred start combinator

use verve_core::{Animatable, Completions, Driver, Millis, Step};

use crate::error::ConfigError;

/// Holds the origin value for a fixed duration, then starts its child with a
/// fresh clock.
///
/// The child never observes the waiting period: its `start` receives the
/// expiry timestamp, so a delayed animation plays exactly like an undelayed
/// one launched later.
pub struct Delay<T: Animatable> {
    duration: Millis,
    child: Box<dyn Driver<T>>,
    origin: Option<T>,
    started_at: Millis,
    child_started: bool,
}

impl<T: Animatable> Delay<T> {
    /// Wrap `child` so it starts `duration` milliseconds after attach.
    pub fn new(duration: Millis, child: impl Driver<T> + 'static) -> Result<Self, ConfigError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ConfigError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            child: Box::new(child),
            origin: None,
            started_at: 0.0,
            child_started: false,
        })
    }
}

impl<T: Animatable> Driver<T> for Delay<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.started_at = now;
        self.origin = Some(origin);
        self.child_started = false;
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        let origin = self.origin.expect("delay stepped before start");
        if !self.child_started {
            if now - self.started_at < self.duration {
                return Step::running(origin);
            }
            self.child.start(now, origin);
            self.child_started = true;
        }
        self.child.step(now, completions)
    }

    fn reverse(&mut self) -> bool {
        self.child.reverse()
    }
}

// ============================================================================
// Tests
// ============================================================================
