//! Undo log of committed item mutations.
//!
//! Entries hold deep copies of the pre-mutation item so later edits cannot
//! corrupt them. Callers decide mutation boundaries: a whole drag is one
//! entry no matter how many positions it visited. Undo consumes entries
//! LIFO and there is no redo.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use crate::doc::{Item, ItemId};

/// The kind of mutation an entry undoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Update,
    Delete,
}

/// One undoable mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub op: OpKind,
    /// Item the mutation applied to.
    pub id: ItemId,
    /// Item state before the mutation; `None` for `Add` (it did not exist).
    pub pre_image: Option<Item>,
}

/// LIFO log of undoable mutations.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&mut self, op: OpKind, id: ItemId, pre_image: Option<Item>) {
        self.entries.push(HistoryEntry { op, id, pre_image });
    }

    /// Record that `id` was created.
    pub fn record_add(&mut self, id: ItemId) {
        self.record(OpKind::Add, id, None);
    }

    /// Record that `pre_image` is about to be modified.
    pub fn record_update(&mut self, pre_image: &Item) {
        self.record(OpKind::Update, pre_image.id, Some(pre_image.clone()));
    }

    /// Record that `pre_image` is about to be deleted.
    pub fn record_delete(&mut self, pre_image: &Item) {
        self.record(OpKind::Delete, pre_image.id, Some(pre_image.clone()));
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop()
    }

    /// The most recent entry, if any.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Re-key every entry for `old` to `new` (a pending item was confirmed).
    pub fn remap(&mut self, old: &ItemId, new: ItemId) {
        for entry in &mut self.entries {
            if entry.id == *old {
                entry.id = new;
                if let Some(image) = entry.pre_image.as_mut() {
                    image.id = new;
                }
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
