//! Study-day arithmetic.
//!
//! A study day starts at `daily_reset_hour` in the user's UTC offset, so a
//! review made at 01:30 with a reset hour of 4 still counts towards the previous
//! day.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};

/// Maps timestamps to study days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyClock {
    offset: FixedOffset,
    daily_reset_hour: u32,
}

impl Default for StudyClock {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            daily_reset_hour: 0,
        }
    }
}

impl StudyClock {
    /// # Arguments
    /// * `utc_offset_minutes` - Offset of the user's local time from UTC
    /// * `daily_reset_hour` - Hour of day (0-23) when a new study day begins
    pub fn new(utc_offset_minutes: i32, daily_reset_hour: u32) -> Result<Self> {
        if daily_reset_hour > 23 {
            return Err(Error::Config(format!(
                "daily reset hour must be 0-23, got {daily_reset_hour}"
            )));
        }
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| Error::Config(format!("invalid UTC offset: {utc_offset_minutes} minutes")))?;
        Ok(Self {
            offset,
            daily_reset_hour,
        })
    }

    pub fn daily_reset_hour(&self) -> u32 {
        self.daily_reset_hour
    }

    /// Study day containing `ts`.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        let local = ts.with_timezone(&self.offset);
        (local - Duration::hours(i64::from(self.daily_reset_hour))).date_naive()
    }
}

/// Whether `now` falls on a later study day than `last`. No previous timestamp
/// counts as a new day.
pub fn is_new_day(last: Option<DateTime<Utc>>, now: DateTime<Utc>, clock: &StudyClock) -> bool {
    match last {
        None => true,
        Some(last) => clock.day_of(now) > clock.day_of(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn midnight_reset_uses_calendar_date() {
        let clock = StudyClock::default();
        assert_eq!(
            clock.day_of(at(2024, 3, 10, 23, 59)),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(
            clock.day_of(at(2024, 3, 11, 0, 0)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn before_reset_hour_counts_as_previous_day() {
        let clock = StudyClock::new(0, 4).unwrap();
        assert_eq!(
            clock.day_of(at(2024, 3, 11, 3, 30)),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
        assert_eq!(
            clock.day_of(at(2024, 3, 11, 4, 0)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn offset_shifts_the_day_boundary() {
        // UTC+2: 23:00 UTC is already 01:00 the next day.
        let clock = StudyClock::new(120, 0).unwrap();
        assert_eq!(
            clock.day_of(at(2024, 3, 10, 23, 0)),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn new_day_detection() {
        let clock = StudyClock::default();
        assert!(is_new_day(None, at(2024, 3, 10, 8, 0), &clock));
        assert!(!is_new_day(Some(at(2024, 3, 10, 8, 0)), at(2024, 3, 10, 22, 0), &clock));
        assert!(is_new_day(Some(at(2024, 3, 10, 23, 0)), at(2024, 3, 11, 0, 5), &clock));
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(StudyClock::new(0, 24).is_err());
        assert!(StudyClock::new(24 * 60, 0).is_err());
    }
}
