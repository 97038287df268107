//! Week arithmetic with Monday-first weeks where week 1 is the week containing
//! January 1st (one day of the new year is enough).
//!
//! A late-December date whose week already contains the next January 1st belongs to
//! week 1. Week 1 may start in the previous year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as i64;
    date.checked_sub_signed(Duration::days(back)).unwrap_or(date)
}

pub fn week_of_year(date: NaiveDate) -> u32 {
    let start = week_start(date);
    if let Some(next_jan1) = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1) {
        if week_start(next_jan1) == start {
            return 1;
        }
    }
    match NaiveDate::from_ymd_opt(date.year(), 1, 1) {
        Some(jan1) => ((start - week_start(jan1)).num_days() / 7 + 1) as u32,
        None => 1,
    }
}

/// Day `weekday` of week `week` of `year`.
pub fn date_of_week(year: i32, week: u32, weekday: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = 7 * (week as i64 - 1) + weekday.num_days_from_monday() as i64;
    week_start(jan1).checked_add_signed(Duration::days(offset))
}
