//! Daily activity: per-day review counts and the daily goal.

use crate::dates::{is_new_day, StudyClock};
use crate::error::{Error, Result};
use crate::types::DailyProgressStat;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Append-only log of per-day review counts, ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyLog {
    days: Vec<DailyProgressStat>,
}

impl DailyLog {
    pub fn new(mut days: Vec<DailyProgressStat>) -> Self {
        days.sort_by_key(|d| d.date);
        days.dedup_by_key(|d| d.date);
        Self { days }
    }

    pub fn days(&self) -> &[DailyProgressStat] {
        &self.days
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyProgressStat> {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .ok()
            .map(|idx| &self.days[idx])
    }

    /// Count one completed review on `date`, creating the day's record on first use.
    pub fn record(&mut self, date: NaiveDate, was_correct: bool) -> &DailyProgressStat {
        let idx = match self.days.binary_search_by_key(&date, |d| d.date) {
            Ok(idx) => idx,
            Err(idx) => {
                self.days.insert(idx, DailyProgressStat::empty(date));
                idx
            }
        };
        let day = &mut self.days[idx];
        day.words_reviewed += 1;
        if was_correct {
            day.correct += 1;
        } else {
            day.incorrect += 1;
        }
        &self.days[idx]
    }
}

/// Reviews completed today against the user's goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub goal: u32,
    pub completed_today: u32,
    pub last_completion: Option<DateTime<Utc>>,
}

impl DailyGoal {
    pub fn new(goal: u32) -> Result<Self> {
        validate_goal(goal)?;
        Ok(Self {
            goal,
            completed_today: 0,
            last_completion: None,
        })
    }

    /// Seed today's count from the daily log, e.g. after a restart.
    pub fn resume(goal: u32, log: &DailyLog, now: DateTime<Utc>, clock: &StudyClock) -> Result<Self> {
        let mut this = Self::new(goal)?;
        if let Some(today) = log.get(clock.day_of(now)) {
            this.completed_today = today.words_reviewed;
            this.last_completion = Some(now);
        }
        Ok(this)
    }

    pub fn set_goal(&mut self, goal: u32) -> Result<()> {
        validate_goal(goal)?;
        self.goal = goal;
        Ok(())
    }

    /// Reset the counter if `now` is on a later study day than the last completion.
    pub fn observe(&mut self, now: DateTime<Utc>, clock: &StudyClock) {
        if self.last_completion.is_some() && is_new_day(self.last_completion, now, clock) {
            tracing::debug!(previous = self.completed_today, "daily goal counter rolled over");
            self.completed_today = 0;
            self.last_completion = None;
        }
    }

    pub fn record_completion(&mut self, now: DateTime<Utc>, clock: &StudyClock) {
        self.observe(now, clock);
        self.completed_today += 1;
        self.last_completion = Some(now);
    }

    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.completed_today)
    }

    pub fn is_met(&self) -> bool {
        self.completed_today >= self.goal
    }
}

fn validate_goal(goal: u32) -> Result<()> {
    if goal == 0 {
        return Err(Error::Config("daily goal must be a positive number".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn log_creates_then_increments() {
        let mut log = DailyLog::default();
        log.record(date(10), true);
        log.record(date(10), false);
        log.record(date(9), true);
        assert_eq!(log.days().len(), 2);
        assert_eq!(log.days()[0].date, date(9));
        let today = log.get(date(10)).unwrap();
        assert_eq!((today.words_reviewed, today.correct, today.incorrect), (2, 1, 1));
    }

    #[test]
    fn goal_counts_and_rolls_over() {
        let clock = StudyClock::default();
        let mut goal = DailyGoal::new(2).unwrap();
        goal.record_completion(at(10, 8), &clock);
        goal.record_completion(at(10, 9), &clock);
        assert!(goal.is_met());
        assert_eq!(goal.remaining(), 0);

        goal.observe(at(10, 23), &clock);
        assert_eq!(goal.completed_today, 2);

        goal.observe(at(11, 0) + Duration::minutes(1), &clock);
        assert_eq!(goal.completed_today, 0);
        assert_eq!(goal.remaining(), 2);
    }

    #[test]
    fn rollover_respects_reset_hour() {
        let clock = StudyClock::new(0, 4).unwrap();
        let mut goal = DailyGoal::new(5).unwrap();
        goal.record_completion(at(10, 22), &clock);
        goal.record_completion(at(11, 2), &clock);
        assert_eq!(goal.completed_today, 2);
        goal.record_completion(at(11, 5), &clock);
        assert_eq!(goal.completed_today, 1);
    }

    #[test]
    fn zero_goal_is_rejected() {
        assert!(matches!(DailyGoal::new(0), Err(Error::Config(_))));
        let mut goal = DailyGoal::new(3).unwrap();
        assert!(goal.set_goal(0).is_err());
        assert_eq!(goal.goal, 3);
    }

    #[test]
    fn resume_picks_up_todays_count() {
        let clock = StudyClock::default();
        let mut log = DailyLog::default();
        log.record(date(10), true);
        log.record(date(10), true);
        let goal = DailyGoal::resume(20, &log, at(10, 18), &clock).unwrap();
        assert_eq!(goal.completed_today, 2);
        let tomorrow = DailyGoal::resume(20, &log, at(11, 18), &clock).unwrap();
        assert_eq!(tomorrow.completed_today, 0);
    }
}
