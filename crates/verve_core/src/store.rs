//! Shared value store (render side)
//!
//! The authoritative home of every shared value. Cells are type-erased boxes
//! behind typed accessors, so one store holds scalars, vectors, and matrices
//! side by side. The control context never touches this directly; it sends
//! commands across the bridge and reads its own mirror.
//!
//! Cancellation works through epochs: every plain write, attach, and cancel
//! bumps the cell's epoch, and a driver job that captured an older epoch
//! retires without stepping. That gives "an overwrite takes effect before the
//! next tick examines the driver" with no locks and no back-references from
//! cells into the scheduler.

use std::any::Any;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animatable::Animatable;
use crate::driver::Completions;

/// Identity of a shared value. Minted on the control side, unique per
/// context pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(u64);

impl ValueId {
    /// Convert to a raw u64 (stable across the pair's lifetime, useful for
    /// diagnostics and FFI).
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw u64 previously obtained via `to_raw`.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Type-erased, clonable cell payload.
pub(crate) trait DynValue: Any + Send {
    fn clone_box(&self) -> Box<dyn DynValue>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Animatable> DynValue for T {
    fn clone_box(&self) -> Box<dyn DynValue> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Cell {
    value: Box<dyn DynValue>,
    /// Bumped by plain writes, attaches, and cancels. Driver commits leave
    /// it alone, so a driver never cancels itself.
    epoch: u64,
    dirty: bool,
}

/// Render-side registry of value cells.
#[derive(Default)]
pub struct ValueStore {
    cells: FxHashMap<ValueId, Cell>,
    /// Commit order of cells that changed this tick, deduped via `Cell::dirty`.
    dirty: SmallVec<[ValueId; 8]>,
    completions: Completions,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest committed value, synchronously. `None` for an unknown id or a
    /// mismatched type.
    pub fn read<T: Animatable>(&self, id: ValueId) -> Option<T> {
        self.cells
            .get(&id)
            .and_then(|cell| cell.value.as_any().downcast_ref::<T>())
            .copied()
    }

    /// Plain write: last-writer-wins, and detaches any driver animating the
    /// cell (the driver retires before it next steps and its completion
    /// callback never fires).
    pub fn write<T: Animatable>(&mut self, id: ValueId, value: T) {
        self.set(id, value, true);
    }

    /// Driver-side write: commits the sample without detaching the writer.
    pub(crate) fn commit<T: Animatable>(&mut self, id: ValueId, value: T) {
        self.set(id, value, false);
    }

    fn set<T: Animatable>(&mut self, id: ValueId, value: T, bump_epoch: bool) {
        let Some(cell) = self.cells.get_mut(&id) else {
            return;
        };
        if bump_epoch {
            cell.epoch += 1;
        }
        let changed = cell.value.as_any().downcast_ref::<T>() != Some(&value);
        if changed {
            cell.value = Box::new(value);
            if !cell.dirty {
                cell.dirty = true;
                self.dirty.push(id);
            }
        }
    }

    pub(crate) fn create<T: Animatable>(&mut self, id: ValueId, initial: T) {
        self.cells.insert(
            id,
            Cell { value: Box::new(initial), epoch: 0, dirty: false },
        );
    }

    pub(crate) fn remove(&mut self, id: ValueId) {
        self.cells.remove(&id);
    }

    pub(crate) fn epoch(&self, id: ValueId) -> Option<u64> {
        self.cells.get(&id).map(|cell| cell.epoch)
    }

    /// Detach whatever driver is animating the cell, keeping the current
    /// value. Returns the new epoch.
    pub(crate) fn bump_epoch(&mut self, id: ValueId) -> Option<u64> {
        self.cells.get_mut(&id).map(|cell| {
            cell.epoch += 1;
            cell.epoch
        })
    }

    pub(crate) fn completions_mut(&mut self) -> &mut Completions {
        &mut self.completions
    }

    pub(crate) fn take_completions(&mut self) -> Completions {
        std::mem::take(&mut self.completions)
    }

    /// Cells that changed this tick, in commit order, with their final
    /// values. Clears the dirty marks.
    pub(crate) fn take_dirty(&mut self) -> Vec<(ValueId, Box<dyn DynValue>)> {
        let mut changed = Vec::with_capacity(self.dirty.len());
        for id in self.dirty.drain(..) {
            if let Some(cell) = self.cells.get_mut(&id) {
                cell.dirty = false;
                changed.push((id, cell.value.clone_box()));
            }
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_read_write() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 0.5f64);
        assert_eq!(store.read::<f64>(id), Some(0.5));
        store.write(id, 2.0f64);
        assert_eq!(store.read::<f64>(id), Some(2.0));
    }

    #[test]
    fn test_mismatched_type_reads_none() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 1.0f64);
        assert_eq!(store.read::<f32>(id), None);
        assert_eq!(store.read::<f64>(ValueId::from_raw(99)), None);
    }

    #[test]
    fn test_dirty_dedups_to_final_value() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 0.0f64);
        store.write(id, 1.0f64);
        store.commit(id, 2.0f64);
        let changed = store.take_dirty();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, id);
        assert_eq!(changed[0].1.as_any().downcast_ref::<f64>(), Some(&2.0));
        // Flushed; nothing left until the next write.
        assert!(store.take_dirty().is_empty());
    }

    #[test]
    fn test_identical_write_is_not_a_change() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 4.0f64);
        store.write(id, 4.0f64);
        assert!(store.take_dirty().is_empty());
    }

    #[test]
    fn test_plain_write_bumps_epoch_commit_does_not() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 0.0f64);
        assert_eq!(store.epoch(id), Some(0));
        store.commit(id, 1.0f64);
        assert_eq!(store.epoch(id), Some(0));
        store.write(id, 2.0f64);
        assert_eq!(store.epoch(id), Some(1));
        store.bump_epoch(id);
        assert_eq!(store.epoch(id), Some(2));
    }

    #[test]
    fn test_removed_cell_ignores_writes() {
        let mut store = ValueStore::new();
        let id = ValueId::from_raw(1);
        store.create(id, 1.0f64);
        store.remove(id);
        store.write(id, 5.0f64);
        assert_eq!(store.read::<f64>(id), None);
        assert!(store.take_dirty().is_empty());
    }
}
