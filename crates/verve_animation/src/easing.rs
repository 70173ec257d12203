//! Easing functions for timing-based animation
//!
//! An [`Easing`] maps linear progress `t` in `[0, 1]` to eased progress.
//! Every variant returns exactly `0.0` at `t <= 0` and exactly `1.0` at
//! `t >= 1`, so timing drivers land on their targets without float fuzz.

use crate::error::ConfigError;

// ============================================================================
// Easing
// ============================================================================

/// Easing function to apply to animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// No easing, constant velocity
    Linear,
    /// Cubic acceleration from zero velocity
    EaseIn,
    /// Cubic deceleration to zero velocity
    EaseOut,
    /// Cubic acceleration then deceleration
    #[default]
    EaseInOut,
    /// Quadratic acceleration
    QuadIn,
    /// Quadratic deceleration
    QuadOut,
    /// Quadratic acceleration then deceleration
    QuadInOut,
    /// Sinusoidal acceleration
    SineIn,
    /// Sinusoidal deceleration
    SineOut,
    /// Sinusoidal acceleration then deceleration
    SineInOut,
    /// Custom cubic bezier curve (x1, y1, x2, y2).
    ///
    /// Control point x coordinates must lie within `[0, 1]`; y coordinates
    /// are unconstrained, which permits overshoot curves.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Apply the easing function to progress `t`.
    ///
    /// Input outside `[0, 1]` is pinned to the endpoints.
    pub fn apply(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
            Easing::SineIn => 1.0 - (t * std::f64::consts::FRAC_PI_2).cos(),
            Easing::SineOut => (t * std::f64::consts::FRAC_PI_2).sin(),
            Easing::SineInOut => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
            Easing::CubicBezier(x1, y1, x2, y2) => bezier_ease(t, x1, y1, x2, y2),
        }
    }

    /// Check that the variant's parameters describe a usable curve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Easing::CubicBezier(x1, y1, x2, y2) = *self {
            let xs_in_range = (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2);
            let all_finite =
                x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite();
            if !xs_in_range || !all_finite {
                return Err(ConfigError::InvalidBezier { x1, y1, x2, y2 });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Cubic bezier evaluation
// ============================================================================

/// Evaluate a 1D cubic bezier with endpoints 0 and 1 at parameter `s`.
fn bezier_axis(s: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * s * p1 + 3.0 * u * s * s * p2 + s * s * s
}

/// Derivative of `bezier_axis` with respect to `s`.
fn bezier_axis_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * p1 + 6.0 * u * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Solve the curve parameter whose x coordinate equals `x`, then evaluate y.
///
/// Newton-Raphson converges in a handful of iterations for well-behaved
/// control points; a bisection pass catches flat-slope regions.
fn bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let mut s = x;
    for _ in 0..8 {
        let err = bezier_axis(s, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_axis(s, y1, y2);
        }
        let slope = bezier_axis_slope(s, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        s -= err / slope;
        s = s.clamp(0.0, 1.0);
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    s = x;
    for _ in 0..24 {
        let err = bezier_axis(s, x1, x2) - x;
        if err.abs() < 1e-7 {
            break;
        }
        if err > 0.0 {
            hi = s;
        } else {
            lo = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier_axis(s, y1, y2)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 11] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn endpoints_are_exact_for_every_variant() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
            assert_eq!(easing.apply(-0.5), 0.0, "{easing:?} below range");
            assert_eq!(easing.apply(1.5), 1.0, "{easing:?} above range");
        }
    }

    #[test]
    fn outputs_stay_in_range_for_non_overshoot_curves() {
        for easing in ALL {
            for i in 0..=100 {
                let t = i as f64 / 100.0;
                let eased = easing.apply(t);
                assert!(
                    (-0.001..=1.001).contains(&eased),
                    "{easing:?} at {t} gave {eased}"
                );
            }
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        for i in 1..50 {
            let t = i as f64 / 100.0;
            let a = Easing::EaseInOut.apply(t);
            let b = Easing::EaseInOut.apply(1.0 - t);
            assert!((a + b - 1.0).abs() < 1e-9, "asymmetric at {t}");
        }
    }

    #[test]
    fn bezier_matches_known_curve() {
        // ease-in-out-ish material curve, spot checked at the midpoint
        let easing = Easing::CubicBezier(0.42, 0.0, 0.58, 1.0);
        let mid = easing.apply(0.5);
        assert!((mid - 0.5).abs() < 1e-4, "midpoint was {mid}");
        assert!(easing.apply(0.25) < 0.25);
        assert!(easing.apply(0.75) > 0.75);
    }

    #[test]
    fn bezier_is_monotonic_for_monotonic_control_points() {
        let easing = Easing::CubicBezier(0.3, 0.2, 0.7, 0.9);
        let mut last = 0.0;
        for i in 1..=100 {
            let eased = easing.apply(i as f64 / 100.0);
            assert!(eased >= last - 1e-9, "dipped at step {i}");
            last = eased;
        }
    }

    #[test]
    fn overshoot_bezier_exceeds_one_mid_curve() {
        let easing = Easing::CubicBezier(0.34, 1.56, 0.64, 1.0);
        let peak = (1..100)
            .map(|i| easing.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.0, "no overshoot, peak {peak}");
        assert_eq!(easing.apply(1.0), 1.0);
    }

    #[test]
    fn validate_rejects_out_of_range_x() {
        assert!(Easing::CubicBezier(-0.1, 0.0, 0.5, 1.0).validate().is_err());
        assert!(Easing::CubicBezier(0.1, 0.0, 1.5, 1.0).validate().is_err());
        assert!(Easing::CubicBezier(f64::NAN, 0.0, 0.5, 1.0).validate().is_err());
        assert!(Easing::CubicBezier(0.1, f64::INFINITY, 0.5, 1.0).validate().is_err());
        assert!(Easing::CubicBezier(0.25, -2.0, 0.75, 3.0).validate().is_ok());
        assert!(Easing::EaseInOut.validate().is_ok());
    }
}
