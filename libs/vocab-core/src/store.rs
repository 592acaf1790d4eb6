//! In-memory item store.
//!
//! The store owns every item's learning state. It keeps insertion order, which
//! the due queue relies on for tie-breaking, and notifies subscribers after each
//! mutation so views can re-render from memory.

use crate::algorithm::ReviewOutcome;
use crate::error::{Error, Result};
use crate::types::{BulkEdit, ItemDraft, ItemId, VocabularyItem};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    Added { ids: Vec<ItemId> },
    Updated { ids: Vec<ItemId> },
    Reviewed { id: ItemId },
    Removed { ids: Vec<ItemId> },
    Replaced { count: usize },
}

/// Handle returned by [`ItemStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

/// Ordered collection of vocabulary items.
#[derive(Default)]
pub struct ItemStore {
    items: Vec<VocabularyItem>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStore")
            .field("items", &self.items.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ItemStore {
    pub fn new(items: Vec<VocabularyItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&VocabularyItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Register a listener called after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn position(&self, id: ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or(Error::ItemNotFound(id))
    }

    /// Add a new, never-reviewed item.
    pub fn add(&mut self, draft: &ItemDraft, now: DateTime<Utc>) -> Result<ItemId> {
        if let Some(problem) = draft.validate() {
            return Err(Error::InvalidItem(problem));
        }
        let mut item = VocabularyItem::new("", "", now);
        item.apply_draft(draft);
        let id = item.id;
        self.items.push(item);
        self.notify(StoreEvent::Added { ids: vec![id] });
        Ok(id)
    }

    /// Append already-built items (import). Ids must not collide with stored items.
    pub fn extend(&mut self, items: Vec<VocabularyItem>) -> Result<usize> {
        let existing: HashSet<ItemId> = self.items.iter().map(|i| i.id).collect();
        if let Some(dup) = items.iter().find(|i| existing.contains(&i.id)) {
            return Err(Error::InvalidItem(format!("item {} already exists", dup.id)));
        }
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        let count = ids.len();
        self.items.extend(items);
        self.notify(StoreEvent::Added { ids });
        Ok(count)
    }

    /// Replace the whole collection.
    pub fn replace_all(&mut self, items: Vec<VocabularyItem>) {
        let count = items.len();
        self.items = items;
        self.notify(StoreEvent::Replaced { count });
    }

    /// Replace the content fields of an item.
    pub fn edit(&mut self, id: ItemId, draft: &ItemDraft) -> Result<&VocabularyItem> {
        if let Some(problem) = draft.validate() {
            return Err(Error::InvalidItem(problem));
        }
        let idx = self.position(id)?;
        self.items[idx].apply_draft(draft);
        self.notify(StoreEvent::Updated { ids: vec![id] });
        Ok(&self.items[idx])
    }

    pub fn delete(&mut self, id: ItemId) -> Result<VocabularyItem> {
        let idx = self.position(id)?;
        let removed = self.items.remove(idx);
        self.notify(StoreEvent::Removed { ids: vec![id] });
        Ok(removed)
    }

    /// Apply `edit` to every listed item that exists. Returns the ids touched.
    pub fn bulk_edit(&mut self, ids: &[ItemId], edit: &BulkEdit) -> Vec<ItemId> {
        let wanted: HashSet<ItemId> = ids.iter().copied().collect();
        let mut touched = Vec::new();
        for item in self.items.iter_mut().filter(|i| wanted.contains(&i.id)) {
            if let Some(category) = &edit.category {
                item.category = Some(category.clone());
            }
            if let Some(difficulty) = edit.difficulty {
                item.difficulty = Some(difficulty);
            }
            if edit.reset_progress {
                item.reset_progress();
            }
            touched.push(item.id);
        }
        if !touched.is_empty() {
            self.notify(StoreEvent::Updated { ids: touched.clone() });
        }
        touched
    }

    /// Delete every listed item that exists. Returns the ids removed.
    pub fn bulk_delete(&mut self, ids: &[ItemId]) -> Vec<ItemId> {
        let wanted: HashSet<ItemId> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        self.items.retain(|item| {
            if wanted.contains(&item.id) {
                removed.push(item.id);
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.notify(StoreEvent::Removed { ids: removed.clone() });
        }
        removed
    }

    /// Write the repetition engine's outcome into the item.
    pub fn apply_review(&mut self, id: ItemId, outcome: &ReviewOutcome) -> Result<&VocabularyItem> {
        let idx = self.position(id)?;
        let item = &mut self.items[idx];
        item.repetition_level = outcome.repetition_level;
        item.correct_count = outcome.correct_count;
        item.incorrect_count = outcome.incorrect_count;
        item.last_reviewed = Some(outcome.last_reviewed);
        item.next_review_date = Some(outcome.next_review_date);
        self.notify(StoreEvent::Reviewed { id });
        Ok(&self.items[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{IntervalLadder, RepetitionEngine};
    use crate::types::Difficulty;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn store_with(words: &[(&str, &str)]) -> ItemStore {
        let items = words
            .iter()
            .map(|(w, t)| VocabularyItem::new(*w, *t, now()))
            .collect();
        ItemStore::new(items)
    }

    #[test]
    fn add_and_lookup() {
        let mut store = ItemStore::default();
        let id = store.add(&ItemDraft::new(" dog ", "pes"), now()).unwrap();
        let item = store.get(id).unwrap();
        assert_eq!(item.word, "dog");
        assert_eq!(item.repetition_level, 0);
        assert!(item.next_review_date.is_none());
    }

    #[test]
    fn add_rejects_blank_word() {
        let mut store = ItemStore::default();
        let result = store.add(&ItemDraft::new("", "pes"), now());
        assert!(matches!(result, Err(Error::InvalidItem(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn edit_keeps_learning_state() {
        let mut store = store_with(&[("dog", "pes")]);
        let id = store.items()[0].id;
        let outcome = IntervalLadder::default().advance(&store.items()[0], true, now());
        store.apply_review(id, &outcome).unwrap();

        let mut draft = ItemDraft::new("hound", "pes");
        draft.difficulty = Some(Difficulty::Hard);
        let item = store.edit(id, &draft).unwrap();
        assert_eq!(item.word, "hound");
        assert_eq!(item.repetition_level, 1);
        assert_eq!(item.correct_count, 1);
    }

    #[test]
    fn delete_missing_item_fails() {
        let mut store = ItemStore::default();
        let missing = uuid::Uuid::new_v4();
        assert!(matches!(store.delete(missing), Err(Error::ItemNotFound(id)) if id == missing));
    }

    #[test]
    fn bulk_edit_and_reset() {
        let mut store = store_with(&[("dog", "pes"), ("cat", "kočka"), ("cow", "kráva")]);
        let ids: Vec<ItemId> = store.items().iter().map(|i| i.id).collect();
        let outcome = IntervalLadder::default().advance(&store.items()[0], false, now());
        store.apply_review(ids[0], &outcome).unwrap();

        let edit = BulkEdit {
            category: Some("animals".to_string()),
            difficulty: None,
            reset_progress: true,
        };
        let touched = store.bulk_edit(&ids[..2], &edit);
        assert_eq!(touched, ids[..2].to_vec());
        assert_eq!(store.items()[0].category.as_deref(), Some("animals"));
        assert_eq!(store.items()[0].incorrect_count, 0);
        assert!(store.items()[0].is_new());
        assert_eq!(store.items()[2].category, None);
    }

    #[test]
    fn bulk_delete_keeps_order_of_rest() {
        let mut store = store_with(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let ids: Vec<ItemId> = store.items().iter().map(|i| i.id).collect();
        let removed = store.bulk_delete(&[ids[1], uuid::Uuid::new_v4()]);
        assert_eq!(removed, vec![ids[1]]);
        let words: Vec<&str> = store.items().iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["a", "c"]);
    }

    #[test]
    fn extend_rejects_colliding_ids() {
        let mut store = store_with(&[("dog", "pes")]);
        let clone = store.items()[0].clone();
        assert!(store.extend(vec![clone]).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn subscribers_receive_events() {
        let mut store = ItemStore::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let id = store.add(&ItemDraft::new("dog", "pes"), now()).unwrap();
        store.delete(id).unwrap();
        assert!(store.unsubscribe(sub));
        store.add(&ItemDraft::new("cat", "kočka"), now()).unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                StoreEvent::Added { ids: vec![id] },
                StoreEvent::Removed { ids: vec![id] },
            ]
        );
    }
}
