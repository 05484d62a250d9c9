use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::domain::entities::grid::{GridSnapshot, SharedSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryCapacity {
    #[default]
    Unbounded,
    /// Oldest entries are dropped once the history holds more than this many snapshots.
    MaxEntries(NonZeroUsize),
}

/// Linear undo/redo over grid snapshots.
///
/// `cursor` always points at a valid entry; anything after it is the redo branch.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    snapshots: Vec<SharedSnapshot>,
    cursor: usize,
    capacity: HistoryCapacity,
}

impl HistoryManager {
    pub fn new(initial: SharedSnapshot, capacity: HistoryCapacity) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity,
        }
    }

    pub fn empty(capacity: HistoryCapacity) -> Self {
        Self::new(Arc::new(GridSnapshot::default()), capacity)
    }

    pub fn reset(&mut self, initial: SharedSnapshot) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
    }

    pub fn push(&mut self, snapshot: SharedSnapshot) -> SharedSnapshot {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);

        if let HistoryCapacity::MaxEntries(max) = self.capacity {
            let excess = self.snapshots.len().saturating_sub(max.get());
            if excess > 0 {
                self.snapshots.drain(..excess);
            }
        }

        self.cursor = self.snapshots.len() - 1;
        self.current().clone()
    }

    pub fn undo(&mut self) -> SharedSnapshot {
        if self.can_undo() {
            self.cursor -= 1;
        }
        self.current().clone()
    }

    pub fn redo(&mut self) -> SharedSnapshot {
        if self.can_redo() {
            self.cursor += 1;
        }
        self.current().clone()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> &SharedSnapshot {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> HistoryCapacity {
        self.capacity
    }
}
