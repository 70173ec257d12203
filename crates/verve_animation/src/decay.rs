//! Momentum decay driver
//!
//! Carries gesture release velocity forward while an exponential friction
//! model bleeds it off. Optional clamp bounds stop the motion dead at an
//! edge, which is how scroll containers hand off to their overscroll effect.

use verve_core::{Animatable, CompletionCallback, Completions, Driver, Millis, Step};

use crate::error::ConfigError;

/// Velocity magnitude (units per second) below which the motion counts as
/// stopped.
const REST_VELOCITY: f64 = 1.0;

// ============================================================================
// DecayConfig
// ============================================================================

/// Configuration for a [`Decay`] driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig<T: Animatable> {
    /// Launch velocity in units per second, usually taken from a gesture
    /// recognizer at release.
    pub velocity: T,
    /// Per-millisecond velocity retention factor, strictly between 0 and 1.
    /// The default matches typical scroll deceleration.
    pub deceleration: f64,
    /// Inclusive bounds. Crossing either one clamps the value onto it and
    /// finishes the animation immediately.
    pub clamp: Option<(T, T)>,
}

impl<T: Animatable> DecayConfig<T> {
    pub fn new(velocity: T) -> Self {
        Self {
            velocity,
            deceleration: 0.998,
            clamp: None,
        }
    }

    /// Set the per-millisecond velocity retention factor.
    pub fn deceleration(mut self, deceleration: f64) -> Self {
        self.deceleration = deceleration;
        self
    }

    /// Bound the motion to `[lower, upper]` componentwise.
    pub fn clamp(mut self, lower: T, upper: T) -> Self {
        self.clamp = Some((lower, upper));
        self
    }
}

// ============================================================================
// Decay
// ============================================================================

/// Friction-only driver with no target; it ends wherever the momentum runs
/// out or at the first clamp bound it crosses.
pub struct Decay<T: Animatable> {
    velocity: T,
    deceleration: f64,
    clamp: Option<(T, T)>,
    initial_velocity: T,
    value: T,
    last_tick: Millis,
    done: bool,
    on_done: Option<CompletionCallback>,
}

impl<T: Animatable> Decay<T> {
    /// Create a decay driver.
    ///
    /// Rejects deceleration outside `(0, 1)` and clamp bounds whose lower
    /// corner exceeds the upper one on any component.
    pub fn new(config: DecayConfig<T>) -> Result<Self, ConfigError> {
        let usable = config.deceleration.is_finite()
            && config.deceleration > 0.0
            && config.deceleration < 1.0;
        if !usable {
            return Err(ConfigError::InvalidDeceleration(config.deceleration));
        }
        if let Some((lower, upper)) = config.clamp {
            if !lower.component_le(upper) {
                return Err(ConfigError::InvalidClampBounds);
            }
        }
        Ok(Self {
            velocity: config.velocity,
            deceleration: config.deceleration,
            clamp: config.clamp,
            initial_velocity: config.velocity,
            value: T::ZERO,
            last_tick: 0.0,
            done: false,
            on_done: None,
        })
    }

    /// Register a callback to run on the control side once the motion stops.
    /// Detachment and overwrite never fire it.
    pub fn on_done(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }

    fn finish(&mut self, completions: &mut Completions) -> Step<T> {
        self.done = true;
        if let Some(callback) = self.on_done.take() {
            completions.push(callback);
        }
        Step::finished(self.value)
    }
}

impl<T: Animatable> Driver<T> for Decay<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.value = origin;
        self.velocity = self.initial_velocity;
        self.last_tick = now;
        self.done = false;
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        if self.done {
            return Step::finished(self.value);
        }

        let dt = (now - self.last_tick).max(0.0);
        self.last_tick = now;
        self.velocity = self.velocity.scale(self.deceleration.powf(dt));
        self.value = self.value.add(self.velocity.scale(dt / 1000.0));

        if let Some((lower, upper)) = self.clamp {
            let clamped = self.value.clamp_to(lower, upper);
            if clamped != self.value {
                self.value = clamped;
                return self.finish(completions);
            }
        }
        if self.velocity.magnitude() < REST_VELOCITY {
            return self.finish(completions);
        }
        Step::running(self.value)
    }
}

// ============================================================================
// Tests
// ============================================================================
