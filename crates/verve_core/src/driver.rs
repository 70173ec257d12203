//! Animation driver protocol
//!
//! A driver is a stateful stepping function: attach it to a shared value and
//! the render loop polls it once per frame until it reports
//! [`Status::Finished`]. Leaves (timing, spring, decay) produce values;
//! combinators own child drivers and form trees. All of them speak this
//! protocol, which is what lets combinators nest arbitrarily.

use smallvec::SmallVec;

use crate::animatable::Animatable;
use crate::clock::Millis;

/// Whether a driver wants more frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Running,
    Finished,
}

/// One sample out of a driver: the value to commit plus the driver status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step<T> {
    pub value: T,
    pub status: Status,
}

impl<T> Step<T> {
    pub fn running(value: T) -> Self {
        Self { value, status: Status::Running }
    }

    pub fn finished(value: T) -> Self {
        Self { value, status: Status::Finished }
    }

    pub fn is_finished(&self) -> bool {
        self.status == Status::Finished
    }
}

/// A completion callback supplied by the caller, run on the control context.
pub type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Collects the completion callbacks fired while stepping a driver tree.
///
/// A leaf pushes its own callback at the moment it transitions to Finished;
/// the render loop drains the buffer after the tick and marshals the
/// callbacks across the bridge. Push order is finish order, which for a
/// sequence is strictly the declared child order.
#[derive(Default)]
pub struct Completions {
    fired: SmallVec<[CompletionCallback; 2]>,
}

impl Completions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: CompletionCallback) {
        self.fired.push(callback);
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// Remove and return the collected callbacks, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = CompletionCallback> + '_ {
        self.fired.drain(..)
    }
}

/// The stepping protocol every animation driver implements.
pub trait Driver<T: Animatable>: Send {
    /// Called exactly once, when the driver transitions from attached to
    /// running. `origin` is the value being animated at that moment and
    /// becomes the interpolation start point; `now` resets the driver's
    /// local clock.
    fn start(&mut self, now: Millis, origin: T);

    /// Advance to `now` and report the value for this frame.
    ///
    /// A driver that has transitioned to Finished pushes its completion
    /// callback (if any) into `completions` during that same call, exactly
    /// once. Stepping again after Finished must keep returning the final
    /// value.
    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T>;

    /// Swap the driver's start and end points, for alternating repeats.
    ///
    /// Returns false when the driver has no fixed target to swap (decay) or
    /// composes children it cannot meaningfully mirror (sequence); callers
    /// fall back to replaying forward.
    fn reverse(&mut self) -> bool {
        false
    }
}

impl<T: Animatable, D: Driver<T> + ?Sized> Driver<T> for Box<D> {
    fn start(&mut self, now: Millis, origin: T) {
        (**self).start(now, origin)
    }

    fn step(&mut self, now: Millis, completions: &mut Completions) -> Step<T> {
        (**self).step(now, completions)
    }

    fn reverse(&mut self) -> bool {
        (**self).reverse()
    }
}
