//! Calendar walks used by the occurrence generator.
//!
//! All functions operate on plain calendar dates; timezones are applied later
//! when occurrences are materialized.

use chrono::{Datelike, Days, NaiveDate};

use crate::recurrence::model::{DayOccurrence, DayOfWeek, LAST_DAY_OF_MONTH};

/// Every calendar date from `start` to `end`, both inclusive.
///
/// Empty when `start > end`.
#[must_use]
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Every `(year, month)` pair touched by `[start, end]`, in order.
#[must_use]
pub fn months_between(start: NaiveDate, end: NaiveDate) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    if start > end {
        return months;
    }

    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) <= (end.year(), end.month()) {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// ## Summary
/// Years from `start`'s year to `end`'s year, stepping by `interval`.
///
/// An interval of 0 yields nothing.
#[must_use]
pub fn years_between(start: NaiveDate, end: NaiveDate, interval: u32) -> Vec<i32> {
    let Ok(step) = usize::try_from(interval) else {
        return Vec::new();
    };
    if step == 0 || start > end {
        return Vec::new();
    }
    (start.year()..=end.year()).step_by(step).collect()
}

/// Last calendar day of the given month.
#[must_use]
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(chrono::Months::new(1))?.pred_opt()
}

/// ## Summary
/// Resolves a `days_of_month` entry to a date.
///
/// `-1` is the last day of the month. Days the month does not have (31 in
/// April, 30 in February) and values outside `1..=31` resolve to `None`.
#[must_use]
pub fn month_day(year: i32, month: u32, day: i8) -> Option<NaiveDate> {
    if day == LAST_DAY_OF_MONTH {
        return last_day_of_month(year, month);
    }
    let day = u32::try_from(day).ok().filter(|d| (1..=31).contains(d))?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// ## Summary
/// The `occurrence`-th `weekday` of a month, e.g. the third Wednesday.
///
/// `DayOccurrence::Last` walks back from the month's final day.
#[must_use]
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: DayOfWeek,
    occurrence: DayOccurrence,
) -> Option<NaiveDate> {
    let weekday = weekday.to_chrono();
    match occurrence {
        DayOccurrence::Last => {
            let last = last_day_of_month(year, month)?;
            let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday())
                % 7;
            last.checked_sub_days(Days::new(u64::from(back)))
        }
        nth => {
            let n = u8::try_from(nth.ordinal()).ok()?;
            NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
        }
    }
}
