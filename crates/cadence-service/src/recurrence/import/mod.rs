//! Maps iCalendar RRULE text onto a [`RecurrenceRule`].
//!
//! Only what the rule model can express is accepted. Anything else fails the
//! whole import with the offending token, never a partial rule.

use std::collections::BTreeSet;

use cadence_rfc::rfc::ical::{
    DateValue, Frequency, ParseError, ParseErrorKind, RRule, TimeZoneResolver, ZonedValue,
    localize, parse_recurrence, to_local,
};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use super::generate::generate;
use super::model::{
    DayOccurrence, DayOfWeek, EventLength, LAST_DAY_OF_MONTH, Month, MonthlySchedule,
    RecurrencePattern, RecurrenceRule, SeriesDocument,
};

/// Rule parts the importer understands. WKST is accepted and has no effect.
const SUPPORTED_PARTS: [&str; 8] = [
    "FREQ",
    "INTERVAL",
    "UNTIL",
    "COUNT",
    "WKST",
    "BYDAY",
    "BYMONTHDAY",
    "BYMONTH",
];

/// Longest horizon searched when resolving COUNT, in days.
const COUNT_HORIZON_DAYS: u64 = 200 * 366;

/// Why an RRULE could not be imported. Every variant names its token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("Malformed recurrence: {0}")]
    Parse(ParseError),

    #[error("Unsupported rule part `{token}`")]
    UnsupportedPart { token: String },

    #[error("Unsupported value `{value}` for `{token}`")]
    UnsupportedValue { token: String, value: String },

    #[error("Missing rule part `{token}`")]
    MissingPart { token: String },

    #[error("`UNTIL` and `COUNT` are mutually exclusive")]
    UntilCountConflict,

    #[error("`{token}` cannot be represented: {reason}")]
    Unrepresentable { token: String, reason: String },

    #[error("Unknown timezone `{tzid}` in `{token}`")]
    UnknownTimezone { token: String, tzid: String },
}

impl ImportError {
    /// The rule part or property the import failed on.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Parse(err) => &err.token,
            Self::UnsupportedPart { token }
            | Self::UnsupportedValue { token, .. }
            | Self::MissingPart { token }
            | Self::Unrepresentable { token, .. }
            | Self::UnknownTimezone { token, .. } => token,
            Self::UntilCountConflict => "COUNT",
        }
    }

    fn unsupported_value(token: &str, value: impl ToString) -> Self {
        Self::UnsupportedValue {
            token: token.to_string(),
            value: value.to_string(),
        }
    }

    fn unrepresentable(token: &str, reason: &str) -> Self {
        Self::Unrepresentable {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ParseError> for ImportError {
    fn from(err: ParseError) -> Self {
        if err.kind == ParseErrorKind::UntilCountConflict {
            Self::UntilCountConflict
        } else {
            Self::Parse(err)
        }
    }
}

/// ## Summary
/// Resolves a TZID for import, normalizing Windows names and aliases.
///
/// ## Errors
/// Returns `ImportError::UnknownTimezone` if the identifier is unknown.
pub fn resolve_timezone(tzid: &str) -> Result<Tz, ImportError> {
    TimeZoneResolver::new()
        .resolve(tzid)
        .map_err(|_e| ImportError::UnknownTimezone {
            token: "TZID".to_string(),
            tzid: tzid.to_string(),
        })
}

/// ## Summary
/// Imports recurrence text against the series' first occurrence.
///
/// `text` holds a bare rule or `RRULE:` line and optional `EXDATE` lines.
/// `first_start` and `first_end` are the first occurrence's local start and
/// end in `tz`; the end only contributes the duration. A DTSTART line in the
/// text is ignored in favour of `first_start`.
///
/// ## Errors
/// Fails with the offending token when the text is malformed, uses a rule
/// part or value the model cannot express, or has neither UNTIL nor COUNT.
#[tracing::instrument(skip_all, fields(tz = %tz))]
pub fn import_rrule(
    text: &str,
    first_start: NaiveDateTime,
    first_end: Option<NaiveDateTime>,
    tz: Tz,
) -> Result<SeriesDocument, ImportError> {
    let parsed = parse_recurrence(text)?;
    if parsed.dtstart.is_some() {
        tracing::debug!("Ignoring DTSTART in favour of the first occurrence");
    }
    let rrule = parsed.rrule;

    if let Some(part) = rrule
        .present_parts()
        .into_iter()
        .find(|part| !SUPPORTED_PARTS.contains(part))
    {
        return Err(ImportError::UnsupportedPart {
            token: part.to_string(),
        });
    }

    let freq = rrule.freq.ok_or_else(|| ImportError::MissingPart {
        token: "FREQ".to_string(),
    })?;
    if let Some(interval) = rrule.interval
        && interval != 1
        && freq != Frequency::Yearly
    {
        return Err(ImportError::unsupported_value("INTERVAL", interval));
    }

    let duration = first_end.map_or(0, |end| {
        u32::try_from((end - first_start).num_seconds().max(0)).unwrap_or(u32::MAX)
    });
    let pattern = map_pattern(&rrule, freq, first_start, duration)?;

    let mut rule = RecurrenceRule {
        timezone: tz,
        range_start: first_start,
        range_end: first_start,
        pattern,
    };
    rule.range_end = range_end(&rrule, &rule)?;

    let excluded_dates = exdate_dates(&parsed.exdates, tz)?;

    tracing::debug!(
        kind = %rule.kind(),
        end = %rule.range_end,
        excluded = excluded_dates.len(),
        "Imported recurrence rule"
    );
    Ok(SeriesDocument {
        rule,
        excluded_dates,
        included_dates: Vec::new(),
    })
}

fn map_pattern(
    rrule: &RRule,
    freq: Frequency,
    first_start: NaiveDateTime,
    duration: u32,
) -> Result<RecurrencePattern, ImportError> {
    let time = first_start.time();
    let length = EventLength::Duration(duration);

    match freq {
        Frequency::Daily | Frequency::Weekly => {
            if !rrule.by_monthday.is_empty() {
                return Err(ImportError::UnsupportedPart {
                    token: "BYMONTHDAY".to_string(),
                });
            }
            reject_by_month(rrule)?;

            if freq == Frequency::Daily && rrule.by_day.is_empty() {
                return Ok(RecurrencePattern::Daily {
                    time,
                    duration_seconds: duration,
                });
            }

            let days_of_week = if rrule.by_day.is_empty() {
                BTreeSet::from([DayOfWeek::from_chrono(first_start.weekday())])
            } else {
                plain_weekdays(rrule)?
            };
            Ok(RecurrencePattern::Weekly {
                time,
                length,
                days_of_week,
            })
        }
        Frequency::Monthly => {
            reject_by_month(rrule)?;
            Ok(RecurrencePattern::Monthly {
                time,
                length,
                schedule: map_schedule(rrule, first_start.date())?,
            })
        }
        Frequency::Yearly => {
            let months = if rrule.by_month.is_empty() {
                BTreeSet::from([Month::from_number(first_start.month())
                    .ok_or_else(|| ImportError::unrepresentable("BYMONTH", "invalid start month"))?])
            } else {
                rrule
                    .by_month
                    .iter()
                    .map(|month| {
                        Month::from_number(u32::from(*month))
                            .ok_or_else(|| ImportError::unsupported_value("BYMONTH", month))
                    })
                    .collect::<Result<_, _>>()?
            };
            Ok(RecurrencePattern::Yearly {
                time,
                length,
                schedule: map_schedule(rrule, first_start.date())?,
                year_interval: rrule.interval.unwrap_or(1),
                months,
            })
        }
        other => Err(ImportError::unsupported_value("FREQ", other)),
    }
}

fn reject_by_month(rrule: &RRule) -> Result<(), ImportError> {
    if rrule.by_month.is_empty() {
        Ok(())
    } else {
        Err(ImportError::UnsupportedPart {
            token: "BYMONTH".to_string(),
        })
    }
}

/// BYDAY entries without ordinals, as for daily and weekly rules.
fn plain_weekdays(rrule: &RRule) -> Result<BTreeSet<DayOfWeek>, ImportError> {
    rrule
        .by_day
        .iter()
        .map(|day| match day.ordinal {
            None => Ok(DayOfWeek::from_ical(day.weekday)),
            Some(_) => Err(ImportError::unsupported_value("BYDAY", day)),
        })
        .collect()
}

fn map_schedule(rrule: &RRule, first_date: NaiveDate) -> Result<MonthlySchedule, ImportError> {
    if !rrule.by_day.is_empty() && !rrule.by_monthday.is_empty() {
        return Err(ImportError::unrepresentable(
            "BYMONTHDAY",
            "cannot be combined with BYDAY",
        ));
    }

    if !rrule.by_day.is_empty() {
        return weekday_schedule(rrule);
    }

    let days_of_month = if rrule.by_monthday.is_empty() {
        BTreeSet::from([i8::try_from(first_date.day())
            .map_err(|_e| ImportError::unrepresentable("BYMONTHDAY", "invalid start day"))?])
    } else {
        rrule
            .by_monthday
            .iter()
            .map(|day| {
                if (1..=31).contains(day) || *day == LAST_DAY_OF_MONTH {
                    Ok(*day)
                } else {
                    Err(ImportError::unsupported_value("BYMONTHDAY", day))
                }
            })
            .collect::<Result<_, _>>()?
    };
    Ok(MonthlySchedule::Monthday { days_of_month })
}

/// BYDAY for monthly and yearly rules. The entries must form a full
/// occurrence x weekday product, since that is all the schedule can hold.
fn weekday_schedule(rrule: &RRule) -> Result<MonthlySchedule, ImportError> {
    let mut pairs = BTreeSet::new();
    let mut any_plain = false;
    let mut any_ordinal = false;

    for entry in &rrule.by_day {
        let weekday = DayOfWeek::from_ical(entry.weekday);
        match entry.ordinal {
            None => {
                any_plain = true;
                for occurrence in DayOccurrence::ALL {
                    pairs.insert((occurrence, weekday));
                }
            }
            Some(ordinal) => {
                any_ordinal = true;
                let occurrence = DayOccurrence::from_ordinal(ordinal)
                    .ok_or_else(|| ImportError::unsupported_value("BYDAY", entry))?;
                pairs.insert((occurrence, weekday));
            }
        }
    }

    if any_plain && any_ordinal {
        return Err(ImportError::unrepresentable(
            "BYDAY",
            "mixes weekdays with and without ordinals",
        ));
    }

    let day_occurrences: BTreeSet<DayOccurrence> = pairs.iter().map(|(o, _)| *o).collect();
    let days_of_week: BTreeSet<DayOfWeek> = pairs.iter().map(|(_, d)| *d).collect();
    if day_occurrences.len() * days_of_week.len() != pairs.len() {
        return Err(ImportError::unrepresentable(
            "BYDAY",
            "ordinals differ between weekdays",
        ));
    }

    Ok(MonthlySchedule::Weekday {
        day_occurrences,
        days_of_week,
    })
}

/// Local end of the range from UNTIL, or from the COUNT-th occurrence.
fn range_end(rrule: &RRule, rule: &RecurrenceRule) -> Result<NaiveDateTime, ImportError> {
    match (&rrule.until, rrule.count) {
        (Some(_), Some(_)) => Err(ImportError::UntilCountConflict),
        (Some(until), None) => Ok(match until {
            DateValue::Date(date) => date.and_time(rule.range_start.time()),
            DateValue::Floating(local) => *local,
            DateValue::Utc(instant) => to_local(rule.timezone, *instant),
        }),
        (None, Some(count)) => count_end(rule, count),
        (None, None) => Err(ImportError::MissingPart {
            token: "UNTIL".to_string(),
        }),
    }
}

/// Widens the horizon until the rule has produced `count` occurrences.
fn count_end(rule: &RecurrenceRule, count: u32) -> Result<NaiveDateTime, ImportError> {
    let index = usize::try_from(count)
        .map_err(|_e| ImportError::unsupported_value("COUNT", count))?
        .saturating_sub(1);
    let start = rule.start_date();

    let mut horizon = 366;
    loop {
        let end = start
            .checked_add_days(Days::new(horizon))
            .ok_or_else(|| ImportError::unrepresentable("COUNT", "date out of range"))?;
        let probe = RecurrenceRule {
            range_end: end.and_time(rule.range_start.time()),
            ..rule.clone()
        };
        let occurrences = generate(&probe, &[]);

        if let Some(nth) = occurrences.get(index) {
            return Ok(to_local(rule.timezone, nth.start));
        }
        if horizon >= COUNT_HORIZON_DAYS {
            tracing::warn!(count, found = occurrences.len(), "COUNT not reached, ending at last occurrence");
            return occurrences
                .last()
                .map(|last| to_local(rule.timezone, last.start))
                .ok_or_else(|| ImportError::unrepresentable("COUNT", "rule never occurs"));
        }
        horizon = (horizon * 4).min(COUNT_HORIZON_DAYS);
    }
}

/// EXDATE values as calendar dates in the rule's timezone.
fn exdate_dates(exdates: &[ZonedValue], tz: Tz) -> Result<Vec<NaiveDate>, ImportError> {
    let mut resolver = TimeZoneResolver::new();
    let mut dates = Vec::with_capacity(exdates.len());

    for exdate in exdates {
        let date = match (&exdate.value, exdate.tzid.as_deref()) {
            (DateValue::Date(date), _) => *date,
            (DateValue::Floating(local), None) => local.date(),
            (DateValue::Floating(local), Some(tzid)) => {
                let source = resolver
                    .resolve(tzid)
                    .map_err(|_e| ImportError::UnknownTimezone {
                        token: "EXDATE".to_string(),
                        tzid: tzid.to_string(),
                    })?;
                to_local(tz, localize(source, *local)).date()
            }
            (DateValue::Utc(instant), _) => to_local(tz, *instant).date(),
        };
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    Ok(dates)
}
