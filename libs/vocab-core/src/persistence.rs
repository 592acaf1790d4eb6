//! Persistence boundary.
//!
//! The core never performs I/O itself. A [`Persistence`] implementation is
//! injected into [`crate::Vocabulary`]; saves happen after every mutation and a
//! failed save is reported as a warning, never rolled back.

use crate::error::PersistenceError;
use crate::types::{DailyProgressStat, TestResult, UserSettings, VocabularyItem};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

type PersistResult<T> = std::result::Result<T, PersistenceError>;

/// Everything loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// `None` when nothing was ever stored; the built-in set is used then.
    pub items: Option<Vec<VocabularyItem>>,
    pub daily_stats: Vec<DailyProgressStat>,
    pub test_history: Vec<TestResult>,
    pub settings: Option<UserSettings>,
}

/// Storage used by the vocabulary workspace.
pub trait Persistence: Send {
    fn load(&self) -> PersistResult<PersistedState>;

    /// Store the full item list, replacing what was there.
    fn save_items(&self, items: &[VocabularyItem]) -> PersistResult<()>;

    /// Insert or update the record of one study day.
    fn save_daily_stat(&self, stat: &DailyProgressStat) -> PersistResult<()>;

    fn append_test_result(&self, result: &TestResult) -> PersistResult<()>;

    fn save_settings(&self, settings: &UserSettings) -> PersistResult<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: PersistedState,
    fail_load: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-process persistence. Clones share the same state, so a test can keep a
/// handle and inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously stored state.
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                state,
                ..Default::default()
            })),
        }
    }

    /// Copy of what is currently stored.
    pub fn snapshot(&self) -> PersistedState {
        self.lock().state.clone()
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.lock().fail_load = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        // A panic elsewhere cannot leave the state half-written, so poisoning is ignored.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write<F>(&self, operation: &'static str, apply: F) -> PersistResult<()>
    where
        F: FnOnce(&mut PersistedState),
    {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(PersistenceError::new(operation, "storage is unavailable"));
        }
        apply(&mut inner.state);
        inner.writes += 1;
        Ok(())
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> PersistResult<PersistedState> {
        let inner = self.lock();
        if inner.fail_load {
            return Err(PersistenceError::new("load", "storage is unavailable"));
        }
        Ok(inner.state.clone())
    }

    fn save_items(&self, items: &[VocabularyItem]) -> PersistResult<()> {
        self.write("save_items", |state| state.items = Some(items.to_vec()))
    }

    fn save_daily_stat(&self, stat: &DailyProgressStat) -> PersistResult<()> {
        self.write("save_daily_stat", |state| {
            match state.daily_stats.iter_mut().find(|d| d.date == stat.date) {
                Some(existing) => *existing = stat.clone(),
                None => state.daily_stats.push(stat.clone()),
            }
        })
    }

    fn append_test_result(&self, result: &TestResult) -> PersistResult<()> {
        self.write("append_test_result", |state| {
            state.test_history.push(result.clone())
        })
    }

    fn save_settings(&self, settings: &UserSettings) -> PersistResult<()> {
        self.write("save_settings", |state| {
            state.settings = Some(settings.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn clones_share_state() {
        let store = MemoryPersistence::new();
        let handle = store.clone();
        store
            .save_items(&[VocabularyItem::new("dog", "pes", Utc::now())])
            .unwrap();
        assert_eq!(handle.snapshot().items.map(|i| i.len()), Some(1));
        assert_eq!(handle.writes(), 1);
    }

    #[test]
    fn daily_stat_is_upserted() {
        let store = MemoryPersistence::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut stat = DailyProgressStat::empty(date);
        store.save_daily_stat(&stat).unwrap();
        stat.words_reviewed = 3;
        store.save_daily_stat(&stat).unwrap();
        let saved = store.load().unwrap().daily_stats;
        assert_eq!(saved, vec![stat]);
    }

    #[test]
    fn injected_failures() {
        let store = MemoryPersistence::new();
        store.set_fail_writes(true);
        let err = store.save_settings(&UserSettings::default()).unwrap_err();
        assert_eq!(err.operation, "save_settings");
        assert_eq!(store.snapshot().settings, None);

        store.set_fail_load(true);
        assert!(store.load().is_err());
    }
}
