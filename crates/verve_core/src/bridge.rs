//! Context bridge
//!
//! Two one-directional queues connect the halves of a context pair. The
//! control->render lane carries commands as boxed closures that run on the
//! render context before its next tick; the render->control lane carries
//! value-change notifications and completion callbacks, drained by
//! [`ControlContext::pump`](crate::context::ControlContext::pump).
//!
//! Enqueueing never blocks. When the peer is gone the message is dropped on
//! the floor: a command for a torn-down render context does nothing, an event
//! for a torn-down control context simply never fires. FIFO order holds per
//! lane, which in particular keeps commands for the same shared value in
//! issue order.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::driver::CompletionCallback;
use crate::store::{DynValue, ValueId};

/// A control-issued command, executed on the render context.
pub(crate) type Command = Box<dyn FnOnce(&mut crate::context::RenderContext) + Send>;

/// Invoked whenever a command is enqueued, so an idle render loop can resume
/// requesting frames.
pub(crate) type WakeFn = Box<dyn Fn() + Send>;

/// Render-produced events, marshaled back to the control context.
pub(crate) enum Event {
    /// A shared value changed this tick; carries the tick's final value.
    Changed { id: ValueId, value: Box<dyn DynValue> },
    /// A driver finished; run its completion callback.
    Done(CompletionCallback),
}

/// Control-side sending half of the command lane.
#[derive(Clone)]
pub(crate) struct CommandSender {
    tx: mpsc::Sender<Command>,
    wake: Arc<Mutex<Option<WakeFn>>>,
}

impl CommandSender {
    pub(crate) fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::trace!("render context gone, command dropped");
            return;
        }
        if let Some(wake) = self.wake.lock().unwrap().as_ref() {
            wake();
        }
    }

    pub(crate) fn set_wake(&self, wake: Option<WakeFn>) {
        *self.wake.lock().unwrap() = wake;
    }
}

/// Render-side sending half of the event lane.
pub(crate) struct EventSender {
    tx: mpsc::Sender<Event>,
}

impl EventSender {
    pub(crate) fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("control context gone, event dropped");
        }
    }
}

/// Build both lanes of a bridge.
pub(crate) fn channels() -> (
    CommandSender,
    mpsc::Receiver<Command>,
    EventSender,
    mpsc::Receiver<Event>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    (
        CommandSender { tx: cmd_tx, wake: Arc::new(Mutex::new(None)) },
        cmd_rx,
        EventSender { tx: evt_tx },
        evt_rx,
    )
}
