//! Per-kind occurrence expansion.

use std::collections::BTreeSet;

use cadence_rfc::rfc::ical::localize;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;

use super::dates::{days_between, month_day, months_between, nth_weekday_of_month, years_between};
use crate::recurrence::model::{
    DayOfWeek, EventLength, Month, MonthlySchedule, Occurrence, RecurrencePattern, RecurrenceRule,
    SlotLength,
};

/// ## Summary
/// Expands a rule into at most `limit` occurrences accepted by `keep`,
/// ascending and without duplicates.
///
/// Dates are walked in order and materialized lazily, so expansion stops once
/// `limit` is reached.
pub(super) fn expand<F>(rule: &RecurrenceRule, limit: usize, keep: F) -> Vec<Occurrence>
where
    F: FnMut(&Occurrence) -> bool,
{
    if rule.is_inverted() {
        tracing::debug!(
            start = %rule.range_start,
            end = %rule.range_end,
            "Range ends before it starts"
        );
        return Vec::new();
    }

    let (start, end) = (rule.start_date(), rule.end_date());
    let tz = rule.timezone;

    let ascending: Box<dyn Iterator<Item = Occurrence>> = match &rule.pattern {
        RecurrencePattern::Daily {
            time,
            duration_seconds,
        } => Box::new(materialize_all(
            tz,
            days_between(start, end),
            *time,
            EventLength::Duration(*duration_seconds),
        )),
        RecurrencePattern::Weekly {
            time,
            length,
            days_of_week,
        } => Box::new(materialize_all(
            tz,
            weekly_dates(start, end, days_of_week),
            *time,
            *length,
        )),
        RecurrencePattern::Monthly {
            time,
            length,
            schedule,
        } => {
            let dates = months_between(start, end)
                .into_iter()
                .flat_map(|(year, month)| schedule_dates(year, month, schedule))
                .filter(|date| (start..=end).contains(date))
                .collect::<BTreeSet<_>>();
            Box::new(materialize_all(tz, dates, *time, *length))
        }
        RecurrencePattern::Yearly {
            time,
            length,
            schedule,
            year_interval,
            months,
        } => Box::new(materialize_all(
            tz,
            yearly_dates(start, end, schedule, *year_interval, months),
            *time,
            *length,
        )),
        RecurrencePattern::Consecutive {
            time,
            end_time,
            duration,
            buffer,
        } => {
            let (time, end_time, duration, buffer) = (*time, *end_time, *duration, *buffer);
            Box::new(
                days_between(start, end)
                    .into_iter()
                    .flat_map(move |date| slots(tz, date, time, end_time, duration, buffer)),
            )
        }
        RecurrencePattern::Custom { dates } => {
            let mut dates = dates.clone();
            dates.sort();
            Box::new(dates.into_iter())
        }
    };

    let mut previous = None;
    let mut occurrences: Vec<Occurrence> = ascending
        .filter(|occurrence| previous.replace(*occurrence) != Some(*occurrence))
        .filter(keep)
        .take(limit)
        .collect();

    // Local walks are ascending; a zone shifting across midnight can still swap a pair
    occurrences.sort();
    occurrences
}

fn weekly_dates(start: NaiveDate, end: NaiveDate, days: &BTreeSet<DayOfWeek>) -> Vec<NaiveDate> {
    if days.is_empty() {
        return Vec::new();
    }
    days_between(start, end)
        .into_iter()
        .filter(|date| days.contains(&DayOfWeek::from_chrono(date.weekday())))
        .collect()
}

/// Dates a monthly schedule selects within one month, unfiltered by range.
fn schedule_dates(year: i32, month: u32, schedule: &MonthlySchedule) -> Vec<NaiveDate> {
    match schedule {
        MonthlySchedule::Weekday {
            day_occurrences,
            days_of_week,
        } => day_occurrences
            .iter()
            .flat_map(move |occurrence| {
                days_of_week.iter().filter_map(move |weekday| {
                    nth_weekday_of_month(year, month, *weekday, *occurrence)
                })
            })
            .collect(),
        MonthlySchedule::Monthday { days_of_month } => days_of_month
            .iter()
            .filter_map(|day| month_day(year, month, *day))
            .collect(),
    }
}

fn yearly_dates(
    start: NaiveDate,
    end: NaiveDate,
    schedule: &MonthlySchedule,
    interval: u32,
    months: &BTreeSet<Month>,
) -> BTreeSet<NaiveDate> {
    let years = years_between(start, end, interval);
    months_between(start, end)
        .into_iter()
        .filter(|(year, month)| {
            years.contains(year) && Month::from_number(*month).is_some_and(|m| months.contains(&m))
        })
        .flat_map(|(year, month)| schedule_dates(year, month, schedule))
        .filter(|date| (start..=end).contains(date))
        .collect()
}

fn materialize_all(
    tz: Tz,
    dates: impl IntoIterator<Item = NaiveDate>,
    time: NaiveTime,
    length: EventLength,
) -> impl Iterator<Item = Occurrence> {
    dates
        .into_iter()
        .filter_map(move |date| materialize(tz, date, time, length))
}

/// ## Summary
/// Builds the occurrence starting at `time` on `date` in `tz`.
///
/// An explicit end time at or before the start time has no rollover; the
/// occurrence is dropped.
pub(super) fn materialize(
    tz: Tz,
    date: NaiveDate,
    time: NaiveTime,
    length: EventLength,
) -> Option<Occurrence> {
    let start = localize(tz, date.and_time(time));
    let end = match length {
        EventLength::Duration(seconds) => start + TimeDelta::seconds(i64::from(seconds)),
        EventLength::EndTime(end_time) if end_time > time => localize(tz, date.and_time(end_time)),
        EventLength::EndTime(end_time) => {
            tracing::debug!(%date, %time, %end_time, "End time not after start time, dropping");
            return None;
        }
    };

    if end < start {
        tracing::debug!(%date, %start, %end, "Occurrence ends before it starts, dropping");
        return None;
    }
    Some(Occurrence::new(start, end))
}

/// Back-to-back slots for one day of a consecutive rule.
fn slots(
    tz: Tz,
    date: NaiveDate,
    time: NaiveTime,
    end_time: NaiveTime,
    duration: SlotLength,
    buffer: SlotLength,
) -> Vec<Occurrence> {
    let length = duration.as_delta();
    if length <= TimeDelta::zero() || end_time < time {
        return Vec::new();
    }
    let step = length + buffer.as_delta();

    let mut slots = Vec::new();
    let mut slot_start = time;
    while slot_start <= end_time {
        let start = localize(tz, date.and_time(slot_start));
        slots.push(Occurrence::new(start, start + length));

        let (next, wrapped) = slot_start.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        slot_start = next;
    }

    tracing::trace!(%date, count = slots.len(), "Expanded consecutive slots");
    slots
}
