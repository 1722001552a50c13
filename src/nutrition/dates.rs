//! Calendar helpers for daily logs and report windows.
//!
//! All dates are `NaiveDate`: a log day is the user's local calendar day and
//! carries no time zone.

use chrono::{Datelike, Duration, NaiveDate};

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of a window of `days` calendar days ending on `end` (inclusive)
pub fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    end - Duration::days(i64::from(days.saturating_sub(1)))
}

/// Every date from `start` to `end`, inclusive. Empty when `start > end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
