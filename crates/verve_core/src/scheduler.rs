//! Frame scheduler
//!
//! An insertion-ordered registry of per-frame callbacks: user callbacks that
//! observe frame timing, and driver jobs that step an animation tree and
//! commit its samples. One tick per display frame; within the tick, the
//! enabled set is snapshotted and each callback runs exactly once, in
//! registration order. Mutations that happen while a tick is in flight take
//! effect starting the next tick.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::animatable::Animatable;
use crate::clock::FrameInfo;
use crate::driver::Driver;
use crate::store::{ValueId, ValueStore};

/// Identity of a registered frame callback. Ids are minted from the context
/// pair's shared counter, so they increase monotonically across both
/// contexts and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameCallbackId(u64);

impl FrameCallbackId {
    pub fn to_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// A user frame callback. Runs on the render context with read/write access
/// to the value store.
pub type FrameCallbackFn = Box<dyn FnMut(&FrameInfo, &mut ValueStore) + Send>;

#[derive(PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Keep,
    Retire,
}

/// Object-safe face of a typed driver job.
pub(crate) trait DriverJob: Send {
    fn tick(&mut self, info: &FrameInfo, store: &mut ValueStore) -> JobOutcome;
}

/// Steps one driver tree and commits its samples into a value cell.
pub(crate) struct ValueJob<T: Animatable> {
    id: ValueId,
    /// Cell epoch captured at attach. A mismatch means the value was
    /// overwritten or re-animated since; the job retires without stepping.
    epoch: u64,
    driver: Box<dyn Driver<T>>,
    started: bool,
}

impl<T: Animatable> ValueJob<T> {
    pub(crate) fn new(id: ValueId, epoch: u64, driver: Box<dyn Driver<T>>) -> Self {
        Self { id, epoch, driver, started: false }
    }
}

impl<T: Animatable> DriverJob for ValueJob<T> {
    fn tick(&mut self, info: &FrameInfo, store: &mut ValueStore) -> JobOutcome {
        if store.epoch(self.id) != Some(self.epoch) {
            tracing::debug!(value = self.id.to_raw(), "driver detached, job retires");
            return JobOutcome::Retire;
        }
        if !self.started {
            let Some(origin) = store.read::<T>(self.id) else {
                return JobOutcome::Retire;
            };
            self.driver.start(info.timestamp, origin);
            self.started = true;
        }
        let step = self.driver.step(info.timestamp, store.completions_mut());
        store.commit(self.id, step.value);
        if step.is_finished() {
            JobOutcome::Retire
        } else {
            JobOutcome::Keep
        }
    }
}

pub(crate) enum Callback {
    User(FrameCallbackFn),
    Driver(Box<dyn DriverJob>),
}

struct Entry {
    callback: Callback,
    enabled: bool,
}

/// Registry of active per-frame callbacks.
#[derive(Default)]
pub struct FrameScheduler {
    entries: IndexMap<FrameCallbackId, Entry>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: FrameCallbackId, callback: Callback) {
        tracing::trace!(callback = id.to_raw(), "frame callback registered");
        self.entries.insert(id, Entry { callback, enabled: true });
    }

    /// Idempotent: removing an id that was never registered (or was already
    /// removed) is a no-op.
    pub(crate) fn remove(&mut self, id: FrameCallbackId) {
        if self.entries.shift_remove(&id).is_some() {
            tracing::trace!(callback = id.to_raw(), "frame callback unregistered");
        }
    }

    /// Idempotent: toggling to the state an entry is already in, or naming an
    /// unknown id, is a no-op.
    pub(crate) fn set_enabled(&mut self, id: FrameCallbackId, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.enabled = enabled;
        }
    }

    /// Run one frame: snapshot the enabled set, invoke each callback exactly
    /// once in registration order, then apply retirements.
    pub(crate) fn tick(&mut self, info: &FrameInfo, store: &mut ValueStore) {
        let snapshot: SmallVec<[FrameCallbackId; 16]> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(id, _)| *id)
            .collect();

        let mut retired: SmallVec<[FrameCallbackId; 4]> = SmallVec::new();
        for id in snapshot {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            match &mut entry.callback {
                Callback::User(f) => f(info, store),
                Callback::Driver(job) => {
                    if job.tick(info, store) == JobOutcome::Retire {
                        retired.push(id);
                    }
                }
            }
        }
        for id in retired {
            self.entries.shift_remove(&id);
        }
    }

    /// Whether the scheduler has work and the embedder should keep frames
    /// coming. With no enabled callbacks, ticks can stop until the wake
    /// callback announces new work.
    pub fn wants_frames(&self) -> bool {
        self.entries.values().any(|entry| entry.enabled)
    }

    pub fn callback_count(&self) -> usize {
        self.entries.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.enabled).count()
    }
}
