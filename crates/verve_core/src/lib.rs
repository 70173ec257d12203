//! Verve Core Runtime
//!
//! Foundational primitives for the Verve animation engine:
//!
//! - **Shared Values**: typed numeric cells readable and writable from two
//!   contexts, with last-writer-wins semantics
//! - **Frame Scheduler**: insertion-ordered registry of per-frame callbacks
//!   and driver jobs, ticked once per display frame
//! - **Context Bridge**: one-directional command/event lanes between the
//!   control and render halves; the render side never blocks on a lock
//! - **Driver Protocol**: the stepping contract every animation driver
//!   implements, leaves and combinators alike
//!
//! # Example
//!
//! ```rust
//! let (control, mut render) = verve_core::contexts();
//!
//! let opacity = control.shared_value(0.0f64);
//! opacity.set(0.5);
//!
//! // Render thread, once per display frame:
//! render.on_tick(16.7);
//!
//! // Control thread, at its idle point:
//! control.pump();
//! assert_eq!(opacity.get(), 0.5);
//! ```

pub mod animatable;
mod bridge;
pub mod clock;
pub mod context;
pub mod driver;
pub mod scheduler;
pub mod store;
pub mod value;

pub use animatable::Animatable;
pub use clock::{FrameClock, FrameInfo, Millis};
pub use context::{contexts, ControlContext, RenderContext, SubscriptionId};
pub use driver::{CompletionCallback, Completions, Driver, Status, Step};
pub use scheduler::{FrameCallbackFn, FrameCallbackId, FrameScheduler};
pub use store::{ValueId, ValueStore};
pub use value::SharedValue;
