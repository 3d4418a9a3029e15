//! # Calendar helpers
//!
//! Week `n` of a plan starts `(n - 1) * 7` days after the plan's start date,
//! and each day is dated by its offset inside the week (Monday = +0 ...
//! Sunday = +6). Template materialization anchors week 1 on the next Monday.

use crate::tree::DayName;
use chrono::{Datelike, Duration, NaiveDate};

/// First day of week `number` (1-based) of a plan starting at `start`.
pub fn week_start(start: NaiveDate, number: u32) -> NaiveDate {
    start + Duration::days(7 * (i64::from(number.max(1)) - 1))
}

pub fn day_date(week_start: NaiveDate, day: DayName) -> NaiveDate {
    week_start + Duration::days(day.offset())
}

/// The Monday strictly after `today` (a Monday maps to the following one).
pub fn next_monday_after(today: NaiveDate) -> NaiveDate {
    let ahead = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(ahead)
}
