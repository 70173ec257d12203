//! Physics-based spring driver
//!
//! Integrates a damped harmonic oscillator with RK4. Springs have no fixed
//! duration; they finish when displacement and velocity both drop under the
//! configured rest thresholds, or when the safety ceiling elapses.

use verve_core::{Animatable, CompletionCallback, Completions, Driver, Millis, Step};

use crate::error::ConfigError;

/// Largest integration slice in seconds. Longer frame gaps are split so the
/// integrator stays stable across dropped frames.
const MAX_SUBSTEP: f64 = 1.0 / 120.0;

/// Envelope ratio treated as visually at rest when deriving spring constants
/// from a requested duration.
const REST_RATIO: f64 = 0.005;

// ============================================================================
// SpringConfig
// ============================================================================

/// Spring physics parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Spring stiffness coefficient. Higher is snappier.
    pub stiffness: f64,
    /// Damping coefficient. Higher settles with less oscillation.
    pub damping: f64,
    /// Mass of the animated quantity. Higher is more sluggish.
    pub mass: f64,
    /// Displacement magnitude below which the spring may come to rest.
    pub rest_displacement: f64,
    /// Velocity magnitude (units per second) below which the spring may come
    /// to rest.
    pub rest_velocity: f64,
    /// Hard stop in milliseconds. A spring that has not settled by then snaps
    /// to its target and finishes.
    pub max_duration: Millis,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_displacement: 0.01,
            rest_velocity: 2.0,
            max_duration: 10_000.0,
        }
    }
}

impl SpringConfig {
    /// Soft, natural motion
    pub fn gentle() -> Self {
        Self {
            stiffness: 120.0,
            damping: 14.0,
            ..Self::default()
        }
    }

    /// Bouncy with noticeable overshoot
    pub fn wobbly() -> Self {
        Self {
            stiffness: 180.0,
            damping: 12.0,
            ..Self::default()
        }
    }

    /// Quick and responsive
    pub fn stiff() -> Self {
        Self {
            stiffness: 400.0,
            damping: 30.0,
            ..Self::default()
        }
    }

    /// Very fast with minimal oscillation
    pub fn snappy() -> Self {
        Self {
            stiffness: 600.0,
            damping: 40.0,
            ..Self::default()
        }
    }

    /// Derive physics from a perceptual target: the oscillation envelope
    /// decays to [`REST_RATIO`] of the initial displacement at `duration`,
    /// and the ceiling is pinned to `duration` so the spring always ends
    /// there, overriding the natural settle check if needed.
    ///
    /// `damping_ratio` below 1 bounces, 1 is critically damped, above 1
    /// creeps in without overshoot.
    pub fn with_duration(duration: Millis, damping_ratio: f64) -> Self {
        let seconds = duration / 1000.0;
        let decay = -REST_RATIO.ln();
        // Slowest decay rate of the system: zeta * omega0 when underdamped,
        // the slow root of the characteristic equation when overdamped.
        let omega0 = if damping_ratio <= 1.0 {
            decay / (damping_ratio * seconds)
        } else {
            decay / (seconds * (damping_ratio - (damping_ratio * damping_ratio - 1.0).sqrt()))
        };
        let mass = 1.0;
        let stiffness = omega0 * omega0 * mass;
        let damping = 2.0 * damping_ratio * (stiffness * mass).sqrt();
        Self {
            stiffness,
            damping,
            mass,
            max_duration: duration,
            ..Self::default()
        }
    }

    /// Damping at which the spring stops oscillating.
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Ratio of configured damping to critical damping.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / self.critical_damping()
    }
}

// ============================================================================
// Spring
// ============================================================================

/// Spring driver toward a fixed target.
pub struct Spring<T: Animatable> {
    target: T,
    config: SpringConfig,
    initial_velocity: T,
    origin: Option<T>,
    value: T,
    velocity: T,
    started_at: Millis,
    last_tick: Millis,
    on_done: Option<CompletionCallback>,
}

impl<T: Animatable> Spring<T> {
    /// Create a spring driver toward `target`.
    pub fn new(target: T, config: SpringConfig) -> Result<Self, ConfigError> {
        let physical = config.stiffness.is_finite()
            && config.stiffness > 0.0
            && config.mass.is_finite()
            && config.mass > 0.0
            && config.damping.is_finite()
            && config.damping >= 0.0;
        if !physical {
            return Err(ConfigError::InvalidSpring {
                stiffness: config.stiffness,
                damping: config.damping,
                mass: config.mass,
            });
        }
        let resting = config.rest_displacement.is_finite()
            && config.rest_displacement > 0.0
            && config.rest_velocity.is_finite()
            && config.rest_velocity > 0.0;
        if !resting {
            return Err(ConfigError::InvalidRestThresholds {
                displacement: config.rest_displacement,
                velocity: config.rest_velocity,
            });
        }
        if !config.max_duration.is_finite() || config.max_duration <= 0.0 {
            return Err(ConfigError::InvalidDuration(config.max_duration));
        }
        Ok(Self {
            target,
            config,
            initial_velocity: T::ZERO,
            origin: None,
            value: target,
            velocity: T::ZERO,
            started_at: 0.0,
            last_tick: 0.0,
            on_done: None,
        })
    }

    /// Launch with this velocity, in units per second. Lets the spring pick
    /// up seamlessly from a gesture or a previous animation.
    pub fn initial_velocity(mut self, velocity: T) -> Self {
        self.initial_velocity = velocity;
        self
    }

    /// Register a callback to run on the control side once the spring
    /// settles. Detachment and overwrite never fire it.
    pub fn on_done(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_done = Some(Box::new(callback));
        self
    }

    fn acceleration(&self, value: T, velocity: T) -> T {
        let spring_force = self.target.sub(value).scale(self.config.stiffness);
        let damping_force = velocity.scale(-self.config.damping);
        spring_force.add(damping_force).scale(1.0 / self.config.mass)
    }

    /// One RK4 step of `dt` seconds.
    fn integrate(&mut self, dt: f64) {
        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value.add(k1_x.scale(dt * 0.5)),
            self.velocity.add(k1_v.scale(dt * 0.5)),
        );
        let k2_x = self.velocity.add(k1_v.scale(dt * 0.5));

        let k3_v = self.acceleration(
            self.value.add(k2_x.scale(dt * 0.5)),
            self.velocity.add(k2_v.scale(dt * 0.5)),
        );
        let k3_x = self.velocity.add(k2_v.scale(dt * 0.5));

        let k4_v = self.acceleration(
            self.value.add(k3_x.scale(dt)),
            self.velocity.add(k3_v.scale(dt)),
        );
        let k4_x = self.velocity.add(k3_v.scale(dt));

        let dv = k1_v
            .add(k2_v.scale(2.0))
            .add(k3_v.scale(2.0))
            .add(k4_v)
            .scale(dt / 6.0);
        let dx = k1_x
            .add(k2_x.scale(2.0))
            .add(k3_x.scale(2.0))
            .add(k4_x)
            .scale(dt / 6.0);

        self.velocity = self.velocity.add(dv);
        self.value = self.value.add(dx);
    }

    fn is_settled(&self) -> bool {
        self.velocity.magnitude() < self.config.rest_velocity
            && self.target.sub(self.value).magnitude() < self.config.rest_displacement
    }

    fn finish(&mut self, completions: &mut Completions) -> Step<T> {
        self.value = self.target;
        self.velocity = T::ZERO;
        if let Some(callback) = self.on_done.take() {
            completions.push(callback);
        }
        Step::finished(self.target)
    }
}

impl<T: Animatable> Driver<T> for Spring<T> {
    fn start(&mut self, now: Millis, origin: T) {
        self.origin = Some(origin);
        self.value = origin;
        self.velocity = self.initial_velocity;
        self.started_at = now;
        self.last_tick = now;
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        debug_assert!(self.origin.is_some(), "spring stepped before start");
        if now - self.started_at >= self.config.max_duration {
            return self.finish(completions);
        }

        let mut remaining = (now - self.last_tick).max(0.0) / 1000.0;
        self.last_tick = now;
        while remaining > 0.0 {
            let dt = remaining.min(MAX_SUBSTEP);
            self.integrate(dt);
            remaining -= dt;
        }

        if self.is_settled() {
            return self.finish(completions);
        }
        Step::running(self.value)
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
