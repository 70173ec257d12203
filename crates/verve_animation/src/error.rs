//! Driver configuration errors

use thiserror::Error;

/// A rejected driver configuration. Raised at construction, on the control
/// side, before anything crosses the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("duration must be a finite, non-negative number of milliseconds, got {0}")]
    InvalidDuration(f64),

    #[error("cubic bezier x control points must be finite and within [0, 1], got ({x1}, {y1}, {x2}, {y2})")]
    InvalidBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("invalid spring parameters: stiffness {stiffness} and mass {mass} must be positive, damping {damping} non-negative, all finite")]
    InvalidSpring { stiffness: f64, damping: f64, mass: f64 },

    #[error("spring rest thresholds must be positive and finite, got displacement {displacement}, velocity {velocity}")]
    InvalidRestThresholds { displacement: f64, velocity: f64 },

    #[error("deceleration must lie strictly between 0 and 1, got {0}")]
    InvalidDeceleration(f64),

    #[error("clamp bounds are inverted: every component of the lower bound must not exceed the upper bound")]
    InvalidClampBounds,
}
