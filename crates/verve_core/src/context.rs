//! Control and render contexts
//!
//! A Verve instance is a pair: the [`ControlContext`] lives with application
//! logic and issues commands (create values, attach drivers, register frame
//! callbacks); the [`RenderContext`] lives with the embedder's frame loop and
//! advances everything once per display frame. The two halves share nothing
//! but the bridge: the render side takes no locks while ticking, and the
//! control side reads its own mirror, refreshed whenever
//! [`ControlContext::pump`] drains the event lane.
//!
//! All ids and registries are scoped to one pair. Creating a second pair
//! gives a fully independent instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::animatable::Animatable;
use crate::bridge::{self, Command, CommandSender, Event, EventSender};
use crate::clock::{FrameClock, FrameInfo, Millis};
use crate::driver::Driver;
use crate::scheduler::{Callback, FrameCallbackId, FrameScheduler, ValueJob};
use crate::store::{DynValue, ValueId, ValueStore};
use crate::value::SharedValue;

new_key_type! {
    /// Identity of a control-side value subscription.
    pub struct SubscriptionId;
}

/// Type-erased listener; the typed wrapper downcasts before calling user code.
pub(crate) type ListenerFn = Box<dyn FnMut(&dyn std::any::Any) + Send>;

struct Subscription {
    value: ValueId,
    /// Taken out of the slot while the listener runs, so a listener can
    /// subscribe or unsubscribe freely without deadlocking the table.
    listener: Option<ListenerFn>,
}

#[derive(Default)]
struct SubscriptionTable {
    subs: SlotMap<SubscriptionId, Subscription>,
    by_value: FxHashMap<ValueId, SmallVec<[SubscriptionId; 4]>>,
}

impl SubscriptionTable {
    fn add(&mut self, value: ValueId, listener: ListenerFn) -> SubscriptionId {
        let id = self.subs.insert(Subscription { value, listener: Some(listener) });
        self.by_value.entry(value).or_default().push(id);
        id
    }

    fn remove(&mut self, id: SubscriptionId) {
        if let Some(sub) = self.subs.remove(id) {
            if let Some(ids) = self.by_value.get_mut(&sub.value) {
                ids.retain(|s| *s != id);
                if ids.is_empty() {
                    self.by_value.remove(&sub.value);
                }
            }
        }
    }

    fn remove_value(&mut self, value: ValueId) {
        if let Some(ids) = self.by_value.remove(&value) {
            for id in ids {
                self.subs.remove(id);
            }
        }
    }

    fn ids_for(&self, value: ValueId) -> SmallVec<[SubscriptionId; 4]> {
        self.by_value.get(&value).cloned().unwrap_or_default()
    }

    fn take_listener(&mut self, id: SubscriptionId) -> Option<ListenerFn> {
        self.subs.get_mut(id).and_then(|sub| sub.listener.take())
    }

    fn put_back(&mut self, id: SubscriptionId, listener: ListenerFn) {
        // The listener may have removed itself while it ran; the slot is gone
        // then and the closure is dropped here instead.
        if let Some(sub) = self.subs.get_mut(id) {
            sub.listener = Some(listener);
        }
    }
}

pub(crate) struct ControlInner {
    commands: CommandSender,
    events: Mutex<mpsc::Receiver<Event>>,
    /// One id space for values and frame callbacks, shared with the render
    /// half so driver jobs mint from the same sequence.
    ids: Arc<AtomicU64>,
    mirror: Mutex<FxHashMap<ValueId, Box<dyn DynValue>>>,
    subs: Mutex<SubscriptionTable>,
}

impl ControlInner {
    pub(crate) fn mint(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn send(&self, command: Command) {
        self.commands.send(command);
    }

    pub(crate) fn mirror_write(&self, id: ValueId, value: Box<dyn DynValue>) {
        self.mirror.lock().unwrap().insert(id, value);
    }

    pub(crate) fn mirror_read<T: Animatable>(&self, id: ValueId) -> Option<T> {
        self.mirror
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|value| value.as_any().downcast_ref::<T>().copied())
    }

    pub(crate) fn subscribe(&self, id: ValueId, listener: ListenerFn) -> SubscriptionId {
        self.subs.lock().unwrap().add(id, listener)
    }

    /// Last handle for a value dropped: forget everything control-side and
    /// tell the render half to drop the cell.
    pub(crate) fn forget_value(&self, id: ValueId) {
        self.mirror.lock().unwrap().remove(&id);
        self.subs.lock().unwrap().remove_value(id);
        self.send(Box::new(move |rc| rc.store_mut().remove(id)));
    }

    fn dispatch_change(&self, id: ValueId, value: Box<dyn DynValue>) {
        // Refresh the mirror first so a listener reading its handle sees the
        // value it is being told about. Entries are only refreshed, never
        // resurrected after a handle dropped.
        if let Some(slot) = self.mirror.lock().unwrap().get_mut(&id) {
            *slot = value.clone_box();
        }
        // Bind the snapshot so the table lock is released before listeners
        // run; a for-loop head would hold its guard for the whole loop.
        let sub_ids = self.subs.lock().unwrap().ids_for(id);
        for sub_id in sub_ids {
            let listener = self.subs.lock().unwrap().take_listener(sub_id);
            if let Some(mut listener) = listener {
                listener(value.as_any());
                self.subs.lock().unwrap().put_back(sub_id, listener);
            }
        }
    }
}

// ============================================================================
// Control context
// ============================================================================

/// Clonable handle held by application logic. Every mutation becomes a
/// command on the bridge; every observation comes from the mirror, refreshed
/// by [`pump`](Self::pump).
#[derive(Clone)]
pub struct ControlContext {
    inner: Arc<ControlInner>,
}

impl ControlContext {
    /// Create a shared value with `initial` as its committed value.
    pub fn shared_value<T: Animatable>(&self, initial: T) -> SharedValue<T> {
        let id = ValueId::from_raw(self.inner.mint());
        self.inner.mirror_write(id, Box::new(initial));
        self.inner
            .send(Box::new(move |rc| rc.store_mut().create(id, initial)));
        tracing::debug!(value = id.to_raw(), "shared value created");
        SharedValue::new(id, initial, self.inner.clone())
    }

    /// Register a per-frame callback. It runs on the render context, in
    /// registration order relative to other callbacks, starting with the
    /// first tick that drains this command.
    pub fn register_frame_callback(
        &self,
        callback: impl FnMut(&FrameInfo, &mut ValueStore) + Send + 'static,
    ) -> FrameCallbackId {
        let id = FrameCallbackId::from_raw(self.inner.mint());
        let callback: Box<dyn FnMut(&FrameInfo, &mut ValueStore) + Send> = Box::new(callback);
        self.inner
            .send(Box::new(move |rc| rc.scheduler_mut().insert(id, Callback::User(callback))));
        id
    }

    /// Idempotent; unknown ids are ignored on the render side.
    pub fn unregister_frame_callback(&self, id: FrameCallbackId) {
        self.inner.send(Box::new(move |rc| rc.scheduler_mut().remove(id)));
    }

    /// Pause or resume a callback without losing its registration slot.
    pub fn set_frame_callback_enabled(&self, id: FrameCallbackId, enabled: bool) {
        self.inner
            .send(Box::new(move |rc| rc.scheduler_mut().set_enabled(id, enabled)));
    }

    /// Drop a subscription. Idempotent.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.subs.lock().unwrap().remove(id);
    }

    /// Drain pending events from the render half: refresh mirrors, fire
    /// subscribers, run completion callbacks. Returns how many events were
    /// handled. Call this from the control thread's natural idle point.
    pub fn pump(&self) -> usize {
        let mut handled = 0;
        loop {
            // Bind before matching so the receiver lock is released while the
            // event is dispatched; listeners may re-enter this context.
            let next = self.inner.events.lock().unwrap().try_recv();
            let Ok(event) = next else { break };
            match event {
                Event::Changed { id, value } => self.inner.dispatch_change(id, value),
                Event::Done(callback) => callback(),
            }
            handled += 1;
        }
        handled
    }

    /// Install a callback invoked every time a command is enqueued, so an
    /// idle render loop can resume requesting frames.
    pub fn set_wake_callback(&self, wake: impl Fn() + Send + 'static) {
        self.inner.commands.set_wake(Some(Box::new(wake)));
    }

    pub fn clear_wake_callback(&self) {
        self.inner.commands.set_wake(None);
    }
}

// ============================================================================
// Render context
// ============================================================================

/// The render half: owns the authoritative store and the frame scheduler.
/// The embedder calls [`on_tick`](Self::on_tick) once per display frame with
/// the frame's monotonic timestamp; this is the subscription point for the
/// platform clock source.
pub struct RenderContext {
    store: ValueStore,
    scheduler: FrameScheduler,
    clock: FrameClock,
    inbox: mpsc::Receiver<Command>,
    outbox: EventSender,
    ids: Arc<AtomicU64>,
}

impl RenderContext {
    /// Advance one frame: drain pending commands, tick the scheduler, flush
    /// notifications and completions back across the bridge.
    pub fn on_tick(&mut self, timestamp: Millis) {
        let info = self.clock.frame(timestamp);
        loop {
            let command = match self.inbox.try_recv() {
                Ok(command) => command,
                Err(_) => break,
            };
            command(self);
        }
        let Self { scheduler, store, .. } = self;
        scheduler.tick(&info, store);
        self.flush();
    }

    fn flush(&mut self) {
        for (id, value) in self.store.take_dirty() {
            self.outbox.send(Event::Changed { id, value });
        }
        let mut completions = self.store.take_completions();
        for callback in completions.drain() {
            self.outbox.send(Event::Done(callback));
        }
    }

    /// Whether anything is scheduled. When this is false the embedder can
    /// stop ticking until the control side's wake callback announces work.
    pub fn wants_frames(&self) -> bool {
        self.scheduler.wants_frames()
    }

    /// Synchronous view of the authoritative values.
    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ValueStore {
        &mut self.store
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut FrameScheduler {
        &mut self.scheduler
    }

    /// Attach a driver to a value, replacing (and thereby cancelling) any
    /// driver currently animating it. The driver starts on the next tick.
    pub(crate) fn attach<T: Animatable>(&mut self, id: ValueId, driver: Box<dyn Driver<T>>) {
        let Some(epoch) = self.store.bump_epoch(id) else {
            tracing::debug!(value = id.to_raw(), "attach to unknown value dropped");
            return;
        };
        let callback = FrameCallbackId::from_raw(self.ids.fetch_add(1, Ordering::Relaxed));
        self.scheduler
            .insert(callback, Callback::Driver(Box::new(ValueJob::new(id, epoch, driver))));
        tracing::debug!(value = id.to_raw(), callback = callback.to_raw(), "driver attached");
    }
}

/// Build a connected control/render pair.
pub fn contexts() -> (ControlContext, RenderContext) {
    let (commands, inbox, outbox, events) = bridge::channels();
    let ids = Arc::new(AtomicU64::new(0));
    let control = ControlContext {
        inner: Arc::new(ControlInner {
            commands,
            events: Mutex::new(events),
            ids: ids.clone(),
            mirror: Mutex::new(FxHashMap::default()),
            subs: Mutex::new(SubscriptionTable::default()),
        }),
    };
    let render = RenderContext {
        store: ValueStore::new(),
        scheduler: FrameScheduler::new(),
        clock: FrameClock::new(),
        inbox,
        outbox,
        ids,
    };
    (control, render)
}
