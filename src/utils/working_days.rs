use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts Monday–Friday dates in `start..=end` that are not holidays.
/// An inverted range counts as zero days.
pub fn count_working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> u32 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !is_weekend(*day) && !holidays.contains(day))
        .count() as u32
}
