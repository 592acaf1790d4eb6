//! Due-set derivation and the review cursor.

use crate::store::ItemStore;
use crate::types::{ItemId, VocabularyItem};
use chrono::{DateTime, Utc};

/// Items due at `now`.
///
/// Never-scheduled items come first in insertion order, followed by scheduled
/// items in ascending due date. Equal dates keep insertion order.
pub fn due_items(items: &[VocabularyItem], now: DateTime<Utc>) -> Vec<&VocabularyItem> {
    let mut due: Vec<&VocabularyItem> = items.iter().filter(|item| item.is_due(now)).collect();
    // Stable sort; `None` orders before `Some`.
    due.sort_by_key(|item| item.next_review_date);
    due
}

/// Number of items due at `now`.
pub fn due_count(items: &[VocabularyItem], now: DateTime<Utc>) -> usize {
    items.iter().filter(|item| item.is_due(now)).count()
}

/// Snapshot of the due sequence with a cursor on the current item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueQueue {
    sequence: Vec<ItemId>,
    cursor: usize,
}

impl DueQueue {
    /// Build the queue from the store's due set at `now`.
    pub fn build(store: &ItemStore, now: DateTime<Utc>) -> Self {
        Self {
            sequence: due_items(store.items(), now).iter().map(|i| i.id).collect(),
            cursor: 0,
        }
    }

    pub fn current_item(&self) -> Option<ItemId> {
        self.sequence.get(self.cursor).copied()
    }

    /// Items left in this pass, the current one included.
    pub fn remaining(&self) -> usize {
        self.sequence.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_item().is_none()
    }

    /// Move to the next entry that is still due. When the pass runs out, the
    /// queue is rebuilt once from the store so items that became due in the
    /// meantime, or were skipped, are picked up.
    pub fn go_to_next(&mut self, store: &ItemStore, now: DateTime<Utc>) -> Option<ItemId> {
        self.cursor += 1;
        self.settle(store, now)
    }

    /// Drop entries that stopped being due (answered, deleted) at or after the
    /// cursor, rebuilding if the pass is exhausted.
    pub fn settle(&mut self, store: &ItemStore, now: DateTime<Utc>) -> Option<ItemId> {
        while let Some(id) = self.current_item() {
            if store.get(id).is_some_and(|item| item.is_due(now)) {
                return Some(id);
            }
            self.cursor += 1;
        }
        *self = Self::build(store, now);
        self.current_item()
    }
}
