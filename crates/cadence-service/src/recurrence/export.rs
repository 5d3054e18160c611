//! Serializes recurrence rules back to RFC 5545 recurrence lines.

use std::collections::BTreeSet;

use cadence_rfc::rfc::ical::{
    DateValue, Frequency, RRule, RecurrenceText, WeekdayNum, ZonedValue, localize,
    serialize_recurrence,
};
use chrono::{NaiveDate, NaiveTime};

use super::model::{DayOfWeek, MonthlySchedule, RecurrencePattern, RecurrenceRule};

/// ## Summary
/// Renders `rule` as `DTSTART`, `RRULE` and `EXDATE` lines.
///
/// UNTIL is the last second of the range's final date, in UTC. Custom and
/// consecutive rules, and rules missing the sets their kind needs, have no
/// RRULE form and return `None`.
#[must_use]
pub fn export_rrule(rule: &RecurrenceRule, excluded: &[NaiveDate]) -> Option<String> {
    let time = rule.pattern.time()?;
    let rrule = match &rule.pattern {
        RecurrencePattern::Daily { .. } => RRule::with_frequency(Frequency::Daily),
        RecurrencePattern::Weekly { days_of_week, .. } => {
            if days_of_week.is_empty() {
                return None;
            }
            RRule::with_frequency(Frequency::Weekly).with_by_day(every(days_of_week))
        }
        RecurrencePattern::Monthly { schedule, .. } => {
            with_schedule(RRule::with_frequency(Frequency::Monthly), schedule)?
        }
        RecurrencePattern::Yearly {
            schedule,
            year_interval,
            months,
            ..
        } => {
            if months.is_empty() || *year_interval == 0 {
                return None;
            }
            let months = months
                .iter()
                .filter_map(|month| u8::try_from(month.number()).ok())
                .collect();
            with_schedule(RRule::with_frequency(Frequency::Yearly), schedule)?
                .with_interval(*year_interval)
                .with_by_month(months)
        }
        RecurrencePattern::Consecutive { .. } | RecurrencePattern::Custom { .. } => return None,
    };

    let last_second = NaiveTime::from_hms_opt(23, 59, 59)?;
    let until = localize(rule.timezone, rule.end_date().and_time(last_second));
    let tzid = Some(rule.timezone.name().to_string());

    let text = RecurrenceText {
        dtstart: Some(ZonedValue::new(
            DateValue::Floating(rule.start_date().and_time(time)),
            tzid.clone(),
        )),
        rrule: rrule.with_until(DateValue::Utc(until)),
        exdates: excluded
            .iter()
            .map(|date| ZonedValue::new(DateValue::Floating(date.and_time(time)), tzid.clone()))
            .collect(),
    };

    tracing::trace!(kind = %rule.kind(), "Exported recurrence rule");
    Some(serialize_recurrence(&text))
}

fn every(days: &BTreeSet<DayOfWeek>) -> Vec<WeekdayNum> {
    days.iter()
        .map(|day| WeekdayNum::every(day.to_ical()))
        .collect()
}

fn with_schedule(rrule: RRule, schedule: &MonthlySchedule) -> Option<RRule> {
    match schedule {
        MonthlySchedule::Weekday {
            day_occurrences,
            days_of_week,
        } => {
            let by_day: Vec<WeekdayNum> = day_occurrences
                .iter()
                .flat_map(|occurrence| {
                    days_of_week
                        .iter()
                        .filter_map(move |day| WeekdayNum::nth(occurrence.ordinal(), day.to_ical()))
                })
                .collect();
            (!by_day.is_empty()).then(|| rrule.with_by_day(by_day))
        }
        MonthlySchedule::Monthday { days_of_month } => (!days_of_month.is_empty())
            .then(|| rrule.with_by_monthday(days_of_month.iter().copied().collect())),
    }
}
