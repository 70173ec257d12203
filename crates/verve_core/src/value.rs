//! Shared value handles
//!
//! [`SharedValue`] is the control-side face of one value cell. Clones share
//! the cell; when the last clone drops, the cell and its subscriptions go
//! with it. Reads come from the control mirror (eventually consistent,
//! refreshed by `pump`), writes and animations travel the bridge as commands.

use std::fmt;
use std::sync::Arc;

use crate::animatable::Animatable;
use crate::context::{ControlInner, SubscriptionId};
use crate::driver::Driver;
use crate::store::ValueId;

/// A numeric state cell readable and writable from both contexts, with
/// last-writer-wins semantics.
pub struct SharedValue<T: Animatable> {
    handle: Arc<Handle<T>>,
}

struct Handle<T: Animatable> {
    id: ValueId,
    initial: T,
    ctrl: Arc<ControlInner>,
}

impl<T: Animatable> Drop for Handle<T> {
    fn drop(&mut self) {
        tracing::debug!(value = self.id.to_raw(), "shared value dropped");
        self.ctrl.forget_value(self.id);
    }
}

impl<T: Animatable> Clone for SharedValue<T> {
    fn clone(&self) -> Self {
        Self { handle: self.handle.clone() }
    }
}

impl<T: Animatable> SharedValue<T> {
    pub(crate) fn new(id: ValueId, initial: T, ctrl: Arc<ControlInner>) -> Self {
        Self { handle: Arc::new(Handle { id, initial, ctrl }) }
    }

    /// Stable identity, usable from frame callbacks to address the
    /// authoritative cell on the render side.
    pub fn id(&self) -> ValueId {
        self.handle.id
    }

    /// Latest value known to this context: the last value committed by the
    /// render side as of the last `pump`, or this handle's own more recent
    /// `set`.
    pub fn get(&self) -> T {
        self.handle
            .ctrl
            .mirror_read::<T>(self.handle.id)
            .unwrap_or(self.handle.initial)
    }

    /// Plain write. Detaches any driver animating the value (the driver's
    /// completion callback never fires) and updates the local mirror so
    /// program-order reads see the write immediately.
    pub fn set(&self, value: T) {
        let id = self.handle.id;
        self.handle.ctrl.mirror_write(id, Box::new(value));
        self.handle
            .ctrl
            .send(Box::new(move |rc| rc.store_mut().write(id, value)));
    }

    /// Read-modify-write executed on the render context, atomic with respect
    /// to ticks. Like `set`, this detaches any running driver.
    pub fn update(&self, f: impl FnOnce(T) -> T + Send + 'static) {
        let id = self.handle.id;
        self.handle.ctrl.send(Box::new(move |rc| {
            if let Some(current) = rc.store().read::<T>(id) {
                rc.store_mut().write(id, f(current));
            }
        }));
    }

    /// Attach a driver. Replaces (and silently cancels) whatever driver is
    /// currently animating the value; the stored value is untouched until
    /// the driver's first tick.
    pub fn animate(&self, driver: impl Driver<T> + 'static) {
        let id = self.handle.id;
        let driver: Box<dyn Driver<T>> = Box::new(driver);
        self.handle.ctrl.send(Box::new(move |rc| rc.attach(id, driver)));
    }

    /// Detach the current driver, keeping the value where it is. No
    /// completion callback fires.
    pub fn cancel(&self) {
        let id = self.handle.id;
        self.handle.ctrl.send(Box::new(move |rc| {
            if rc.store_mut().bump_epoch(id).is_some() {
                tracing::debug!(value = id.to_raw(), "animation cancelled");
            }
        }));
    }

    /// Observe committed changes. The listener runs on the control context
    /// during `pump`, at most once per frame, with the frame's final value.
    pub fn subscribe(&self, mut listener: impl FnMut(T) + Send + 'static) -> SubscriptionId {
        self.handle.ctrl.subscribe(
            self.handle.id,
            Box::new(move |value| {
                if let Some(value) = value.downcast_ref::<T>() {
                    listener(*value);
                }
            }),
        )
    }
}

impl<T: Animatable> fmt::Debug for SharedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedValue")
            .field("id", &self.handle.id.to_raw())
            .field("value", &self.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::contexts;

    #[test]
    fn test_clones_share_identity() {
        let (control, _render) = contexts();
        let a = control.shared_value(1.5f64);
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        b.set(3.0);
        assert_eq!(a.get(), 3.0);
    }

    #[test]
    fn test_get_before_any_commit_returns_initial() {
        let (control, _render) = contexts();
        let v = control.shared_value([1.0f64, 2.0]);
        assert_eq!(v.get(), [1.0, 2.0]);
    }

    #[test]
    fn test_debug_prints_id_and_value() {
        let (control, _render) = contexts();
        let v = control.shared_value(7.0f64);
        let text = format!("{v:?}");
        assert!(text.contains("SharedValue"));
        assert!(text.contains("7.0"));
    }
}
