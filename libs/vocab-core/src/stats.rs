//! Derived statistics, recomputed on demand from the store, the daily log and
//! the test history.

use crate::dates::StudyClock;
use crate::progress::DailyLog;
use crate::queue::due_count;
use crate::types::{DailyProgressStat, TestResult, VocabularyItem};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Items at or above this level count as mastered.
pub const MASTERED_LEVEL: u32 = 4;

/// Default length of the history calendar.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

pub const UNCATEGORIZED: &str = "uncategorized";
pub const UNSPECIFIED: &str = "unspecified";

/// Coarse mastery classification of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryBucket {
    New,
    Learning,
    Mastered,
}

impl MasteryBucket {
    pub fn of(item: &VocabularyItem) -> Self {
        if item.repetition_level >= MASTERED_LEVEL {
            Self::Mastered
        } else if item.is_new() {
            Self::New
        } else {
            // Level 0 after a failed review still counts as learning.
            Self::Learning
        }
    }
}

/// Aggregated progress of the learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_items: usize,
    pub new_items: usize,
    pub learning_items: usize,
    pub mastered_items: usize,
    pub due_now: usize,
    /// Share of correct answers over all items, 0.0 to 1.0.
    pub accuracy: f64,
    pub total_correct: u64,
    pub total_incorrect: u64,
    /// Reviews summed over the daily log.
    pub total_reviewed: u64,
    pub streak_days: u32,
    pub reviewed_today: u32,
    pub categories: BTreeMap<String, usize>,
    pub difficulties: BTreeMap<String, usize>,
    pub history: Vec<DailyProgressStat>,
    pub tests_taken: usize,
    pub average_test_score: Option<f64>,
    pub best_test_score: Option<u32>,
}

/// Compute the snapshot at `now`.
pub fn statistics(
    items: &[VocabularyItem],
    log: &DailyLog,
    tests: &[TestResult],
    now: DateTime<Utc>,
    clock: &StudyClock,
    history_days: u32,
) -> StatisticsSnapshot {
    let today = clock.day_of(now);

    let mut new_items = 0;
    let mut learning_items = 0;
    let mut mastered_items = 0;
    let mut total_correct = 0u64;
    let mut total_incorrect = 0u64;
    let mut categories = BTreeMap::new();
    let mut difficulties = BTreeMap::new();

    for item in items {
        match MasteryBucket::of(item) {
            MasteryBucket::New => new_items += 1,
            MasteryBucket::Learning => learning_items += 1,
            MasteryBucket::Mastered => mastered_items += 1,
        }
        total_correct += u64::from(item.correct_count);
        total_incorrect += u64::from(item.incorrect_count);

        let category = item
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED);
        *categories.entry(category.to_string()).or_insert(0) += 1;
        let difficulty = item.difficulty.map_or(UNSPECIFIED, |d| d.as_str());
        *difficulties.entry(difficulty.to_string()).or_insert(0) += 1;
    }

    let answered = total_correct + total_incorrect;
    let accuracy = if answered == 0 {
        0.0
    } else {
        total_correct as f64 / answered as f64
    };

    let scores: Vec<u32> = tests.iter().map(TestResult::score).collect();
    let average_test_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64)
    };

    StatisticsSnapshot {
        total_items: items.len(),
        new_items,
        learning_items,
        mastered_items,
        due_now: due_count(items, now),
        accuracy,
        total_correct,
        total_incorrect,
        total_reviewed: log.days().iter().map(|d| u64::from(d.words_reviewed)).sum(),
        streak_days: streak_days(log, today),
        reviewed_today: log.get(today).map_or(0, |d| d.words_reviewed),
        categories,
        difficulties,
        history: history(log, today, history_days),
        tests_taken: tests.len(),
        average_test_score,
        best_test_score: scores.iter().copied().max(),
    }
}

/// Length of the run of consecutive study days with at least one review,
/// ending today or yesterday. A day without reviews ends the run.
pub fn streak_days(log: &DailyLog, today: NaiveDate) -> u32 {
    let active = |date: NaiveDate| log.get(date).is_some_and(|d| d.words_reviewed > 0);

    let mut day = if active(today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if active(yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    loop {
        streak += 1;
        match day.pred_opt() {
            Some(prev) if active(prev) => day = prev,
            _ => return streak,
        }
    }
}

/// The last `days` study days ending today, oldest first. Days without a log
/// record are filled with zeros.
pub fn history(log: &DailyLog, today: NaiveDate, days: u32) -> Vec<DailyProgressStat> {
    (0..i64::from(days))
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            log.get(date)
                .cloned()
                .unwrap_or_else(|| DailyProgressStat::empty(date))
        })
        .collect()
}
