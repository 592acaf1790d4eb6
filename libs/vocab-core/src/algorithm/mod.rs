//! Repetition engine: computes an item's next learning state after an answer.

pub mod ladder;

use crate::types::VocabularyItem;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use ladder::IntervalLadder;

/// Learning state produced by a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub repetition_level: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub last_reviewed: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
}

/// Trait for repetition engines.
///
/// Implementations are pure: they read the item and return the new fields. The
/// item store applies them.
pub trait RepetitionEngine: Send + Sync {
    /// Engine identifier.
    fn name(&self) -> &'static str;

    /// Interval before the next review after a correct answer at `level`.
    /// Must be non-decreasing in `level`.
    fn interval(&self, level: u32) -> Duration;

    /// Compute the state after answering `item`.
    fn advance(&self, item: &VocabularyItem, was_correct: bool, now: DateTime<Utc>) -> ReviewOutcome {
        let level = item.repetition_level;
        if was_correct {
            ReviewOutcome {
                repetition_level: level.saturating_add(1),
                correct_count: item.correct_count.saturating_add(1),
                incorrect_count: item.incorrect_count,
                last_reviewed: now,
                next_review_date: schedule(now, self.interval(level)),
            }
        } else {
            ReviewOutcome {
                repetition_level: level.saturating_sub(1),
                correct_count: item.correct_count,
                incorrect_count: item.incorrect_count.saturating_add(1),
                last_reviewed: now,
                next_review_date: schedule(now, self.interval(0)),
            }
        }
    }
}

/// `now + interval`, clamped to the latest representable time.
fn schedule(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    now.checked_add_signed(interval)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Unbounded;

    impl RepetitionEngine for Unbounded {
        fn name(&self) -> &'static str {
            "unbounded"
        }

        fn interval(&self, _level: u32) -> Duration {
            Duration::MAX
        }
    }

    #[test]
    fn huge_interval_saturates_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let item = VocabularyItem::new("dog", "pes", now);

        let correct = Unbounded.advance(&item, true, now);
        assert_eq!(correct.next_review_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(correct.repetition_level, 1);

        let wrong = Unbounded.advance(&item, false, now);
        assert_eq!(wrong.next_review_date, DateTime::<Utc>::MAX_UTC);
    }
}
