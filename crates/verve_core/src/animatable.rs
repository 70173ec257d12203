//! Animatable value types
//!
//! The numeric carriers a shared value can hold: scalars, and vectors or
//! matrices represented as fixed-size arrays. Drivers touch values only
//! through this trait, so one driver implementation serves every carrier
//! shape with component-wise math.

use std::fmt::Debug;

/// A numeric value that animation drivers can interpolate and integrate.
///
/// All operations are component-wise. `magnitude` is the largest absolute
/// component, which is what settling checks need: every component must be
/// inside the epsilon at once.
pub trait Animatable: Copy + PartialEq + Debug + Send + 'static {
    /// Additive identity, also the default velocity.
    const ZERO: Self;

    /// Linear interpolation from `self` toward `to` by factor `t`.
    fn lerp(self, to: Self, t: f64) -> Self;

    /// Component-wise sum.
    fn add(self, rhs: Self) -> Self;

    /// Component-wise difference.
    fn sub(self, rhs: Self) -> Self;

    /// Every component multiplied by `factor`.
    fn scale(self, factor: f64) -> Self;

    /// Largest absolute component.
    fn magnitude(self) -> f64;

    /// Component-wise clamp into `[lo, hi]`. Bounds are validated where they
    /// enter the system, so inverted bounds never reach this.
    fn clamp_to(self, lo: Self, hi: Self) -> Self;

    /// True when every component of `self` is `<=` its counterpart in `rhs`.
    fn component_le(self, rhs: Self) -> bool;
}

// ============================================================================
// Scalar implementations
// ============================================================================

impl Animatable for f64 {
    const ZERO: Self = 0.0;

    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn scale(self, factor: f64) -> Self {
        self * factor
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn clamp_to(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    fn component_le(self, rhs: Self) -> bool {
        self <= rhs
    }
}

impl Animatable for f32 {
    const ZERO: Self = 0.0;

    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn scale(self, factor: f64) -> Self {
        self * factor as f32
    }

    fn magnitude(self) -> f64 {
        self.abs() as f64
    }

    fn clamp_to(self, lo: Self, hi: Self) -> Self {
        self.max(lo).min(hi)
    }

    fn component_le(self, rhs: Self) -> bool {
        self <= rhs
    }
}

// ============================================================================
// Array implementations (vectors and matrices of any dimension)
// ============================================================================

impl<const N: usize> Animatable for [f64; N] {
    const ZERO: Self = [0.0; N];

    fn lerp(self, to: Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i] + (to[i] - self[i]) * t)
    }

    fn add(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] + rhs[i])
    }

    fn sub(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] - rhs[i])
    }

    fn scale(self, factor: f64) -> Self {
        std::array::from_fn(|i| self[i] * factor)
    }

    fn magnitude(self) -> f64 {
        self.iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    fn clamp_to(self, lo: Self, hi: Self) -> Self {
        std::array::from_fn(|i| self[i].max(lo[i]).min(hi[i]))
    }

    fn component_le(self, rhs: Self) -> bool {
        self.iter().zip(rhs.iter()).all(|(a, b)| a <= b)
    }
}

impl<const N: usize> Animatable for [f32; N] {
    const ZERO: Self = [0.0; N];

    fn lerp(self, to: Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i] + (to[i] - self[i]) * t as f32)
    }

    fn add(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] + rhs[i])
    }

    fn sub(self, rhs: Self) -> Self {
        std::array::from_fn(|i| self[i] - rhs[i])
    }

    fn scale(self, factor: f64) -> Self {
        std::array::from_fn(|i| self[i] * factor as f32)
    }

    fn magnitude(self) -> f64 {
        self.iter().fold(0.0f32, |m, c| m.max(c.abs())) as f64
    }

    fn clamp_to(self, lo: Self, hi: Self) -> Self {
        std::array::from_fn(|i| self[i].max(lo[i]).min(hi[i]))
    }

    fn component_le(self, rhs: Self) -> bool {
        self.iter().zip(rhs.iter()).all(|(a, b)| a <= b)
    }
}
