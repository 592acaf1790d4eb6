//! Interactive review session.
//!
//! ```text
//! NotStarted --start--> Active --last due item answered--> Complete
//!      ^                   |                                  |
//!      +------reset--------+-------------restart--------------+
//! ```
//!
//! Completion is derived from the due queue: the instant no item is left to
//! show, the session is complete.

use crate::algorithm::RepetitionEngine;
use crate::error::{Error, Result};
use crate::queue::DueQueue;
use crate::store::ItemStore;
use crate::types::{ItemId, SessionStats, VocabularyItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    NotStarted,
    Active,
    Complete,
}

/// Result of one answered card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewedCard {
    pub item: VocabularyItem,
    pub was_correct: bool,
    pub next_item: Option<ItemId>,
    pub state: ReviewState,
}

/// Drives one review loop over the due queue.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    state: ReviewState,
    queue: DueQueue,
    stats: Option<SessionStats>,
    revealed: bool,
    run: u32,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn stats(&self) -> Option<&SessionStats> {
        self.stats.as_ref()
    }

    /// Item currently shown. Always `Some` while active.
    pub fn current_item(&self) -> Option<ItemId> {
        match self.state {
            ReviewState::Active => self.queue.current_item(),
            _ => None,
        }
    }

    pub fn remaining(&self) -> usize {
        match self.state {
            ReviewState::Active => self.queue.remaining(),
            _ => 0,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Start (or restart) a session over the items due at `now`.
    ///
    /// With nothing due this returns [`Error::EmptyDueQueue`] and leaves the
    /// session untouched.
    pub fn start(&mut self, store: &ItemStore, now: DateTime<Utc>) -> Result<ItemId> {
        let queue = DueQueue::build(store, now);
        let Some(first) = queue.current_item() else {
            tracing::debug!("review not started: nothing due");
            return Err(Error::EmptyDueQueue);
        };
        tracing::debug!(due = queue.remaining(), "review session started");
        self.queue = queue;
        self.stats = Some(SessionStats::new(now));
        self.state = ReviewState::Active;
        self.revealed = false;
        self.run = 0;
        Ok(first)
    }

    /// Back to `NotStarted`, discarding session statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Show the answer side of the current card.
    pub fn reveal(&mut self) -> Result<ItemId> {
        let current = self.current_item().ok_or(Error::SessionNotActive)?;
        self.revealed = true;
        Ok(current)
    }

    pub fn mark_correct(
        &mut self,
        id: ItemId,
        store: &mut ItemStore,
        engine: &dyn RepetitionEngine,
        now: DateTime<Utc>,
    ) -> Result<ReviewedCard> {
        self.answer(id, true, store, engine, now)
    }

    pub fn mark_incorrect(
        &mut self,
        id: ItemId,
        store: &mut ItemStore,
        engine: &dyn RepetitionEngine,
        now: DateTime<Utc>,
    ) -> Result<ReviewedCard> {
        self.answer(id, false, store, engine, now)
    }

    /// Grade the current item. Answers for any other id are rejected without
    /// touching the store.
    pub fn answer(
        &mut self,
        id: ItemId,
        was_correct: bool,
        store: &mut ItemStore,
        engine: &dyn RepetitionEngine,
        now: DateTime<Utc>,
    ) -> Result<ReviewedCard> {
        if self.state != ReviewState::Active {
            return Err(Error::SessionNotActive);
        }
        let current = self.queue.current_item();
        if current != Some(id) {
            tracing::warn!(submitted = %id, current = ?current, "rejected answer for non-current item");
            return Err(Error::InvalidAnswerTarget {
                submitted: id,
                current,
            });
        }

        let item = store.get(id).ok_or(Error::ItemNotFound(id))?;
        let outcome = engine.advance(item, was_correct, now);
        let item = store.apply_review(id, &outcome)?.clone();

        if let Some(stats) = self.stats.as_mut() {
            stats.reviewed_words.push(id);
            if was_correct {
                stats.correct += 1;
                self.run += 1;
                stats.streak = stats.streak.max(self.run);
            } else {
                stats.incorrect += 1;
                self.run = 0;
            }
        }

        let next_item = self.advance(store, now);
        Ok(ReviewedCard {
            item,
            was_correct,
            next_item,
            state: self.state,
        })
    }

    /// Move past the current item without grading it.
    pub fn skip(&mut self, store: &ItemStore, now: DateTime<Utc>) -> Result<Option<ItemId>> {
        if self.state != ReviewState::Active {
            return Err(Error::SessionNotActive);
        }
        Ok(self.advance(store, now))
    }

    /// Re-check the cursor after the store changed outside the session (an
    /// edit or delete).
    pub fn sync(&mut self, store: &ItemStore, now: DateTime<Utc>) {
        if self.state == ReviewState::Active {
            let before = self.queue.current_item();
            let after = self.queue.settle(store, now);
            if before != after {
                self.revealed = false;
            }
            self.complete_if_exhausted();
        }
    }

    fn advance(&mut self, store: &ItemStore, now: DateTime<Utc>) -> Option<ItemId> {
        self.revealed = false;
        let next = self.queue.go_to_next(store, now);
        self.complete_if_exhausted();
        next
    }

    fn complete_if_exhausted(&mut self) {
        if self.queue.is_exhausted() {
            self.state = ReviewState::Complete;
            if let Some(stats) = &self.stats {
                tracing::debug!(
                    correct = stats.correct,
                    incorrect = stats.incorrect,
                    points = stats.points(),
                    "review session complete"
                );
            }
        }
    }

    /// Point score of the current or last session.
    pub fn points(&self) -> i64 {
        self.stats.as_ref().map_or(0, SessionStats::points)
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.stats.as_ref().map_or(0.0, SessionStats::accuracy_percent)
    }
}
