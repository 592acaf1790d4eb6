//! The vocabulary workspace: one learner's items, sessions and progress.
//!
//! [`Vocabulary`] owns the item store and every session, runs the repetition
//! engine on review answers and writes through the injected [`Persistence`]
//! after each mutation. A failed write never undoes the in-memory change; it
//! comes back as the `warning` of the returned [`Committed`] value.

use crate::algorithm::{IntervalLadder, RepetitionEngine};
use crate::dates::StudyClock;
use crate::defaults::starter_items;
use crate::error::{Error, PersistenceError, Result};
use crate::persistence::Persistence;
use crate::progress::{DailyGoal, DailyLog};
use crate::queue::due_items;
use crate::review::{ReviewSession, ReviewedCard};
use crate::stats::{statistics, StatisticsSnapshot};
use crate::store::{ItemStore, StoreEvent, SubscriptionId};
use crate::test_session::{AnswerFeedback, TestSession, TestState, TestTick};
use crate::transfer::{self, ImportMode, ImportSummary, TransferFormat};
use crate::types::{
    BulkEdit, ItemDraft, ItemId, TestResult, TestSettings, UserSettings, VocabularyItem,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;

/// A value whose in-memory change has been applied, with the persistence
/// failure (if any) that happened while saving it.
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Committed<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    fn with_warnings(value: T, warnings: impl IntoIterator<Item = Option<PersistenceError>>) -> Self {
        Self {
            value,
            warning: warnings.into_iter().flatten().next(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Committed<U> {
        Committed {
            value: f(self.value),
            warning: self.warning,
        }
    }
}

/// Knobs for [`Vocabulary::open`].
pub struct VocabularyOptions {
    pub engine: Box<dyn RepetitionEngine>,
    pub clock: StudyClock,
    /// Used until the learner saves their own settings.
    pub default_settings: UserSettings,
    pub rng: StdRng,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self {
            engine: Box::new(IntervalLadder::default()),
            clock: StudyClock::default(),
            default_settings: UserSettings::default(),
            rng: StdRng::from_entropy(),
        }
    }
}

pub struct Vocabulary {
    persistence: Box<dyn Persistence>,
    engine: Box<dyn RepetitionEngine>,
    clock: StudyClock,
    rng: StdRng,
    store: ItemStore,
    review: ReviewSession,
    test: TestSession,
    log: DailyLog,
    goal: DailyGoal,
    settings: UserSettings,
    history: Vec<TestResult>,
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("engine", &self.engine.name())
            .field("store", &self.store)
            .field("review", &self.review.state())
            .field("test", &self.test.state())
            .field("goal", &self.goal)
            .finish()
    }
}

impl Vocabulary {
    /// Load stored state. Missing items are replaced by the built-in set; a
    /// failed load falls back to the built-in set and is reported as a warning.
    pub fn open(
        persistence: Box<dyn Persistence>,
        options: VocabularyOptions,
        now: DateTime<Utc>,
    ) -> Result<Committed<Self>> {
        let (state, mut warning) = match persistence.load() {
            Ok(state) => (state, None),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load stored vocabulary, using defaults");
                (Default::default(), Some(err))
            }
        };

        let mut settings = state.settings.unwrap_or_else(|| options.default_settings.clone());
        if settings.daily_goal == 0 {
            tracing::warn!("stored daily goal is zero, using the default");
            settings.daily_goal = options.default_settings.daily_goal;
        }
        let log = DailyLog::new(state.daily_stats);
        let goal = DailyGoal::resume(settings.daily_goal, &log, now, &options.clock)?;

        let (items, seeded) = match state.items {
            Some(items) => (items, false),
            None => (starter_items(now), true),
        };
        tracing::info!(
            items = items.len(),
            seeded,
            engine = options.engine.name(),
            "vocabulary opened"
        );

        let this = Self {
            persistence,
            engine: options.engine,
            clock: options.clock,
            rng: options.rng,
            store: ItemStore::new(items),
            review: ReviewSession::new(),
            test: TestSession::default(),
            log,
            goal,
            settings,
            history: state.test_history,
        };
        if seeded && warning.is_none() {
            warning = this.save_items();
        }
        Ok(Committed {
            value: this,
            warning,
        })
    }

    pub fn clock(&self) -> &StudyClock {
        &self.clock
    }

    pub fn engine(&self) -> &dyn RepetitionEngine {
        self.engine.as_ref()
    }

    // Items

    pub fn items(&self) -> &[VocabularyItem] {
        self.store.items()
    }

    pub fn item(&self, id: ItemId) -> Result<&VocabularyItem> {
        self.store.get(id).ok_or(Error::ItemNotFound(id))
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn add_item(&mut self, draft: &ItemDraft, now: DateTime<Utc>) -> Result<Committed<VocabularyItem>> {
        let id = self.store.add(draft, now)?;
        let item = self.item(id)?.clone();
        Ok(Committed::with_warnings(item, [self.save_items()]))
    }

    pub fn edit_item(
        &mut self,
        id: ItemId,
        draft: &ItemDraft,
        now: DateTime<Utc>,
    ) -> Result<Committed<VocabularyItem>> {
        let item = self.store.edit(id, draft)?.clone();
        self.review.sync(&self.store, now);
        Ok(Committed::with_warnings(item, [self.save_items()]))
    }

    pub fn delete_item(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<Committed<VocabularyItem>> {
        let removed = self.store.delete(id)?;
        self.review.sync(&self.store, now);
        Ok(Committed::with_warnings(removed, [self.save_items()]))
    }

    pub fn bulk_edit(&mut self, ids: &[ItemId], edit: &BulkEdit, now: DateTime<Utc>) -> Committed<Vec<ItemId>> {
        let touched = self.store.bulk_edit(ids, edit);
        self.after_bulk(touched, now)
    }

    pub fn bulk_delete(&mut self, ids: &[ItemId], now: DateTime<Utc>) -> Committed<Vec<ItemId>> {
        let removed = self.store.bulk_delete(ids);
        self.after_bulk(removed, now)
    }

    fn after_bulk(&mut self, ids: Vec<ItemId>, now: DateTime<Utc>) -> Committed<Vec<ItemId>> {
        if ids.is_empty() {
            return Committed::clean(ids);
        }
        self.review.sync(&self.store, now);
        Committed::with_warnings(ids, [self.save_items()])
    }

    pub fn due_items(&self, now: DateTime<Utc>) -> Vec<&VocabularyItem> {
        due_items(self.store.items(), now)
    }

    // Review

    pub fn review(&self) -> &ReviewSession {
        &self.review
    }

    pub fn start_review(&mut self, now: DateTime<Utc>) -> Result<ItemId> {
        self.review.start(&self.store, now)
    }

    pub fn reveal(&mut self) -> Result<ItemId> {
        self.review.reveal()
    }

    /// Grade the current review card and record the day's progress.
    pub fn answer_review(
        &mut self,
        id: ItemId,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> Result<Committed<ReviewedCard>> {
        let card = self
            .review
            .answer(id, was_correct, &mut self.store, self.engine.as_ref(), now)?;

        let day = self.log.record(self.clock.day_of(now), was_correct).clone();
        self.goal.record_completion(now, &self.clock);

        let items_warning = self.save_items();
        let stat_warning = self
            .persistence
            .save_daily_stat(&day)
            .map_err(log_save_failure)
            .err();
        Ok(Committed::with_warnings(card, [items_warning, stat_warning]))
    }

    pub fn skip_review(&mut self, now: DateTime<Utc>) -> Result<Option<ItemId>> {
        self.review.skip(&self.store, now)
    }

    pub fn reset_review(&mut self) {
        self.review.reset();
    }

    // Goal and settings

    /// Today's goal progress. Rolls the counter over on a new study day.
    pub fn daily_goal(&mut self, now: DateTime<Utc>) -> &DailyGoal {
        self.goal.observe(now, &self.clock);
        &self.goal
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: UserSettings) -> Result<Committed<UserSettings>> {
        self.goal.set_goal(settings.daily_goal)?;
        self.settings = settings;
        let warning = self
            .persistence
            .save_settings(&self.settings)
            .map_err(log_save_failure)
            .err();
        Ok(Committed::with_warnings(self.settings.clone(), [warning]))
    }

    // Tests

    pub fn test(&self) -> &TestSession {
        &self.test
    }

    pub fn test_history(&self) -> &[TestResult] {
        &self.history
    }

    pub fn configure_test(&mut self, settings: TestSettings) -> Result<()> {
        self.test.configure(settings)
    }

    pub fn prepare_test(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.test.prepare(&self.store, &mut self.rng, now)
    }

    pub fn answer_test(&mut self, input: &str, now: DateTime<Utc>) -> Result<Committed<AnswerFeedback>> {
        let result = self.test.answer(input, now);
        let warning = self.archive_if_complete();
        Ok(Committed::with_warnings(result?, [warning]))
    }

    pub fn skip_test(&mut self, now: DateTime<Utc>) -> Result<Committed<AnswerFeedback>> {
        let result = self.test.skip(now);
        let warning = self.archive_if_complete();
        Ok(Committed::with_warnings(result?, [warning]))
    }

    /// Drive the test countdown. Called by the host timer once a second.
    pub fn tick_test(&mut self, now: DateTime<Utc>) -> Committed<TestTick> {
        let tick = self.test.tick(now);
        let warning = self.archive_if_complete();
        Committed::with_warnings(tick, [warning])
    }

    pub fn cancel_test(&mut self) {
        self.test.cancel();
    }

    /// Moves a freshly completed result into the history exactly once.
    fn archive_if_complete(&mut self) -> Option<PersistenceError> {
        if self.test.state() != TestState::Complete {
            return None;
        }
        let result = self.test.result()?;
        if self.history.last().is_some_and(|last| last.id == result.id) {
            return None;
        }
        let result = result.clone();
        let warning = self
            .persistence
            .append_test_result(&result)
            .map_err(log_save_failure)
            .err();
        self.history.push(result);
        warning
    }

    // Statistics and transfer

    pub fn statistics(&self, now: DateTime<Utc>, history_days: u32) -> StatisticsSnapshot {
        statistics(
            self.store.items(),
            &self.log,
            &self.history,
            now,
            &self.clock,
            history_days,
        )
    }

    /// Import a file. An invalid record rejects the whole batch and leaves the
    /// store untouched.
    pub fn import(
        &mut self,
        content: &str,
        format: TransferFormat,
        mode: ImportMode,
        now: DateTime<Utc>,
    ) -> Result<Committed<ImportSummary>> {
        let items = transfer::parse_items(content, format, now)?;
        let summary = transfer::import_into(&mut self.store, items, mode)?;
        self.review.sync(&self.store, now);
        Ok(Committed::with_warnings(summary, [self.save_items()]))
    }

    pub fn export(&self, format: TransferFormat) -> Result<String> {
        transfer::export(self.store.items(), format)
    }

    fn save_items(&self) -> Option<PersistenceError> {
        self.persistence
            .save_items(self.store.items())
            .map_err(log_save_failure)
            .err()
    }
}

fn log_save_failure(err: PersistenceError) -> PersistenceError {
    tracing::warn!(operation = err.operation, error = %err.message, "save failed, keeping in-memory state");
    err
}
