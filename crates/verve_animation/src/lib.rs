//! Verve Animation
//!
//! The driver family for Verve shared values:
//!
//! - **Timing**: eased interpolation over a fixed duration
//! - **Spring**: RK4-integrated spring physics with configurable rest
//!   thresholds and a perceptual duration mode
//! - **Decay**: gesture momentum with exponential friction and optional
//!   clamp bounds
//! - **Delay / Sequence / Repeat**: combinators that compose any driver
//!   into choreographed timelines
//!
//! Drivers are plain state machines stepped by the render context's frame
//! pump. Attach one to a shared value and the value animates:
//!
//! ```rust
//! use verve_animation::{Easing, Timing, TimingConfig};
//!
//! let (control, mut render) = verve_core::contexts();
//! let x = control.shared_value(0.0f64);
//!
//! x.animate(
//!     Timing::new(100.0, TimingConfig::new(200.0).easing(Easing::Linear))
//!         .expect("valid config"),
//! );
//!
//! render.on_tick(0.0);
//! render.on_tick(100.0);
//! assert_eq!(render.store().read::<f64>(x.id()), Some(50.0));
//!
//! render.on_tick(200.0);
//! control.pump();
//! assert_eq!(x.get(), 100.0);
//! ```

pub mod decay;
pub mod delay;
pub mod easing;
pub mod error;
pub mod repeat;
pub mod sequence;
pub mod spring;
pub mod timing;

pub use decay::{Decay, DecayConfig};
pub use delay::Delay;
pub use easing::Easing;
pub use error::ConfigError;
pub use repeat::Repeat;
pub use sequence::Sequence;
pub use spring::{Spring, SpringConfig};
pub use timing::{Timing, TimingConfig};
