//! Fixed interval ladder.
//!
//! Each correct answer climbs one rung, a wrong answer drops one rung and
//! reschedules at the bottom interval. Levels past the top rung stay there.

use super::RepetitionEngine;
use crate::error::{Error, Result};
use chrono::Duration;

/// Default rungs in days, indexed by repetition level.
pub const DEFAULT_INTERVAL_DAYS: [u32; 5] = [1, 3, 7, 14, 30];

/// Longest accepted rung, about a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Interval ladder with configurable rungs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalLadder {
    days: Vec<u32>,
}

impl Default for IntervalLadder {
    fn default() -> Self {
        Self {
            days: DEFAULT_INTERVAL_DAYS.to_vec(),
        }
    }
}

impl IntervalLadder {
    /// Build a ladder from rungs in days. Rungs must be positive, at most
    /// [`MAX_INTERVAL_DAYS`] and non-decreasing.
    pub fn from_days(days: Vec<u32>) -> Result<Self> {
        if days.is_empty() {
            return Err(Error::Config("interval ladder needs at least one rung".into()));
        }
        if days.contains(&0) {
            return Err(Error::Config("interval ladder rungs must be at least one day".into()));
        }
        if let Some(too_long) = days.iter().find(|&&d| d > MAX_INTERVAL_DAYS) {
            return Err(Error::Config(format!(
                "interval ladder rung of {too_long} days exceeds {MAX_INTERVAL_DAYS}"
            )));
        }
        if days.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::Config(format!(
                "interval ladder must be non-decreasing, got {days:?}"
            )));
        }
        Ok(Self { days })
    }

    /// Parse a comma-separated list such as `1,3,7,14,30`.
    pub fn parse(spec: &str) -> Result<Self> {
        let days = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| Error::Config(format!("invalid interval `{s}`")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_days(days)
    }

    pub fn days(&self) -> &[u32] {
        &self.days
    }
}

impl RepetitionEngine for IntervalLadder {
    fn name(&self) -> &'static str {
        "ladder"
    }

    fn interval(&self, level: u32) -> Duration {
        let idx = (level as usize).min(self.days.len() - 1);
        Duration::days(i64::from(self.days[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VocabularyItem;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn item_at(level: u32) -> VocabularyItem {
        let mut item = VocabularyItem::new("dog", "pes", now());
        item.repetition_level = level;
        item
    }

    #[test]
    fn new_item_correct_goes_to_level_one() {
        let ladder = IntervalLadder::default();
        let outcome = ladder.advance(&item_at(0), true, now());
        assert_eq!(outcome.repetition_level, 1);
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.incorrect_count, 0);
        assert_eq!(outcome.last_reviewed, now());
        assert_eq!(outcome.next_review_date, now() + Duration::days(1));
    }

    #[test]
    fn incorrect_drops_a_level_and_resets_interval() {
        let ladder = IntervalLadder::default();
        let outcome = ladder.advance(&item_at(3), false, now());
        assert_eq!(outcome.repetition_level, 2);
        assert_eq!(outcome.incorrect_count, 1);
        assert_eq!(outcome.next_review_date, now() + Duration::days(1));
    }

    #[test]
    fn incorrect_at_level_zero_stays_at_zero() {
        let ladder = IntervalLadder::default();
        let outcome = ladder.advance(&item_at(0), false, now());
        assert_eq!(outcome.repetition_level, 0);
    }

    #[test]
    fn interval_grows_along_the_ladder() {
        let ladder = IntervalLadder::default();
        let days: Vec<i64> = (0..7).map(|l| ladder.interval(l).num_days()).collect();
        assert_eq!(days, vec![1, 3, 7, 14, 30, 30, 30]);
    }

    #[test]
    fn parse_accepts_custom_curve() {
        let ladder = IntervalLadder::parse(" 1, 2 ,4").unwrap();
        assert_eq!(ladder.days(), &[1, 2, 4]);
    }

    #[test]
    fn rejects_invalid_ladders() {
        assert!(matches!(IntervalLadder::from_days(vec![]), Err(Error::Config(_))));
        assert!(matches!(IntervalLadder::from_days(vec![0, 1]), Err(Error::Config(_))));
        assert!(matches!(IntervalLadder::from_days(vec![3, 1]), Err(Error::Config(_))));
        assert!(matches!(IntervalLadder::parse("1,x"), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_rungs_past_the_ceiling() {
        assert!(matches!(
            IntervalLadder::parse("1,3,4000000000"),
            Err(Error::Config(_))
        ));
        let top = IntervalLadder::from_days(vec![1, MAX_INTERVAL_DAYS]).unwrap();
        let outcome = top.advance(&item_at(5), true, now());
        assert_eq!(outcome.next_review_date, now() + Duration::days(i64::from(MAX_INTERVAL_DAYS)));
    }

    proptest! {
        #[test]
        fn correct_answers_never_lower_the_level(level in 0u32..100, answers in 1usize..20) {
            let ladder = IntervalLadder::default();
            let mut item = item_at(level);
            for _ in 0..answers {
                let before = item.repetition_level;
                let outcome = ladder.advance(&item, true, now());
                prop_assert!(outcome.repetition_level >= before);
                item.repetition_level = outcome.repetition_level;
            }
        }

        #[test]
        fn incorrect_answer_never_raises_the_level(level in 0u32..100) {
            let ladder = IntervalLadder::default();
            let outcome = ladder.advance(&item_at(level), false, now());
            prop_assert!(outcome.repetition_level <= level);
            prop_assert_eq!(outcome.next_review_date, now() + ladder.interval(0));
        }

        #[test]
        fn interval_is_monotonic(a in 0u32..50, b in 0u32..50) {
            let ladder = IntervalLadder::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ladder.interval(lo) <= ladder.interval(hi));
        }
    }
}
