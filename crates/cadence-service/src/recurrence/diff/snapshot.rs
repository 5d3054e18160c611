//! Comparable projection of a recurrence configuration.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::recurrence::model::{
    DayOccurrence, DayOfWeek, EventLength, Month, MonthlySchedule, Occurrence, RecurrencePattern,
    RecurrenceRule, SeriesDocument,
};

/// Fields of a snapshot, in the order they are declared and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    Timezone,
    StartDate,
    EndDate,
    Time,
    Duration,
    EndTime,
    DaysOfWeek,
    ScheduleType,
    DayOccurrences,
    DaysOfMonth,
    YearInterval,
    Months,
    SlotDuration,
    SlotBuffer,
    CustomDates,
    ExcludedDates,
    IncludedDates,
}

impl SnapshotField {
    pub const ALL: [Self; 17] = [
        Self::Timezone,
        Self::StartDate,
        Self::EndDate,
        Self::Time,
        Self::Duration,
        Self::EndTime,
        Self::DaysOfWeek,
        Self::ScheduleType,
        Self::DayOccurrences,
        Self::DaysOfMonth,
        Self::YearInterval,
        Self::Months,
        Self::SlotDuration,
        Self::SlotBuffer,
        Self::CustomDates,
        Self::ExcludedDates,
        Self::IncludedDates,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timezone => "timezone",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::EndTime => "end_time",
            Self::DaysOfWeek => "days_of_week",
            Self::ScheduleType => "schedule_type",
            Self::DayOccurrences => "day_occurrences",
            Self::DaysOfMonth => "days_of_month",
            Self::YearInterval => "year_interval",
            Self::Months => "months",
            Self::SlotDuration => "slot_duration",
            Self::SlotBuffer => "slot_buffer",
            Self::CustomDates => "custom_dates",
            Self::ExcludedDates => "excluded_dates",
            Self::IncludedDates => "included_dates",
        }
    }

    /// Human-readable label for confirmation tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Timezone => "Timezone",
            Self::StartDate => "Start date",
            Self::EndDate => "End date",
            Self::Time => "Start time",
            Self::Duration => "Duration",
            Self::EndTime => "End time",
            Self::DaysOfWeek => "Days of the week",
            Self::ScheduleType => "Schedule type",
            Self::DayOccurrences => "Day occurrences",
            Self::DaysOfMonth => "Days of the month",
            Self::YearInterval => "Year interval",
            Self::Months => "Months",
            Self::SlotDuration => "Slot duration",
            Self::SlotBuffer => "Buffer between slots",
            Self::CustomDates => "Custom dates",
            Self::ExcludedDates => "Excluded dates",
            Self::IncludedDates => "Included dates",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

/// ## Summary
/// A recurrence configuration flattened to canonical strings.
///
/// Two snapshots are equal iff their kinds and every field value are equal.
/// Set-valued fields are written in their natural order; date lists keep the
/// order they were given in and are normalized to `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(rename = "type")]
    pub kind: String,
    pub fields: BTreeMap<SnapshotField, String>,
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

impl ConfigSnapshot {
    /// Projects a rule and its excluded/included dates.
    #[must_use]
    pub fn from_rule(rule: &RecurrenceRule, excluded: &[NaiveDate], included: &[NaiveDate]) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(SnapshotField::Timezone, rule.timezone.name().to_string());
        fields.insert(
            SnapshotField::StartDate,
            rule.start_date().format(DATE_FORMAT).to_string(),
        );
        fields.insert(
            SnapshotField::EndDate,
            rule.end_date().format(DATE_FORMAT).to_string(),
        );

        if let Some(time) = rule.pattern.time() {
            fields.insert(SnapshotField::Time, time.format(TIME_FORMAT).to_string());
        }

        match &rule.pattern {
            RecurrencePattern::Daily {
                duration_seconds, ..
            } => {
                fields.insert(SnapshotField::Duration, duration_seconds.to_string());
            }
            RecurrencePattern::Weekly {
                length,
                days_of_week,
                ..
            } => {
                insert_length(&mut fields, *length);
                fields.insert(SnapshotField::DaysOfWeek, join(days_of_week));
            }
            RecurrencePattern::Monthly {
                length, schedule, ..
            } => {
                insert_length(&mut fields, *length);
                insert_schedule(&mut fields, schedule);
            }
            RecurrencePattern::Yearly {
                length,
                schedule,
                year_interval,
                months,
                ..
            } => {
                insert_length(&mut fields, *length);
                insert_schedule(&mut fields, schedule);
                fields.insert(SnapshotField::YearInterval, year_interval.to_string());
                fields.insert(SnapshotField::Months, join(months));
            }
            RecurrencePattern::Consecutive {
                end_time,
                duration,
                buffer,
                ..
            } => {
                fields.insert(SnapshotField::EndTime, end_time.format(TIME_FORMAT).to_string());
                fields.insert(SnapshotField::SlotDuration, duration.to_string());
                fields.insert(SnapshotField::SlotBuffer, buffer.to_string());
            }
            RecurrencePattern::Custom { dates } => {
                fields.insert(SnapshotField::CustomDates, custom_dates(dates));
            }
        }

        fields.insert(
            SnapshotField::ExcludedDates,
            join(excluded.iter().map(|d| d.format(DATE_FORMAT))),
        );
        fields.insert(
            SnapshotField::IncludedDates,
            join(included.iter().map(|d| d.format(DATE_FORMAT))),
        );

        Self {
            kind: rule.kind().as_str().to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn from_series(series: &SeriesDocument) -> Self {
        Self::from_rule(&series.rule, &series.excluded_dates, &series.included_dates)
    }

    /// ## Summary
    /// Builds a snapshot from raw form-style input.
    ///
    /// The input is an object with a `type` key and any of the snapshot field
    /// names. Dates may carry a time component, times may omit seconds and
    /// set-valued fields may be listed in any order; all of these normalize to
    /// the strings [`ConfigSnapshot::from_rule`] produces. Values that cannot
    /// be interpreted are kept verbatim, so they surface as differences.
    /// Missing or null date lists count as empty, as they do for a stored rule.
    #[must_use]
    pub fn from_raw(raw: &Value) -> Self {
        let kind = raw
            .get("type")
            .and_then(scalar)
            .unwrap_or_default()
            .to_ascii_lowercase();

        let mut fields = BTreeMap::new();
        if let Some(object) = raw.as_object() {
            for (key, value) in object {
                let Some(field) = SnapshotField::from_key(key) else {
                    continue;
                };
                if let Some(normalized) = normalize_raw(field, value) {
                    fields.insert(field, normalized);
                }
            }
        }
        for field in [SnapshotField::ExcludedDates, SnapshotField::IncludedDates] {
            fields.entry(field).or_default();
        }

        Self { kind, fields }
    }

    /// ## Summary
    /// Hex-encoded SHA-256 of the snapshot's canonical JSON.
    ///
    /// Equal snapshots have equal fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut canonical = serde_json::Map::new();
        canonical.insert("type".to_string(), Value::String(self.kind.clone()));
        for (field, value) in &self.fields {
            canonical.insert(field.as_str().to_string(), Value::String(value.clone()));
        }

        let mut hasher = Sha256::new();
        hasher.update(Value::Object(canonical).to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

fn insert_length(fields: &mut BTreeMap<SnapshotField, String>, length: EventLength) {
    match length {
        EventLength::Duration(seconds) => {
            fields.insert(SnapshotField::Duration, seconds.to_string());
        }
        EventLength::EndTime(end_time) => {
            fields.insert(SnapshotField::EndTime, end_time.format(TIME_FORMAT).to_string());
        }
    }
}

fn insert_schedule(fields: &mut BTreeMap<SnapshotField, String>, schedule: &MonthlySchedule) {
    match schedule {
        MonthlySchedule::Weekday {
            day_occurrences,
            days_of_week,
        } => {
            fields.insert(SnapshotField::ScheduleType, "weekday".to_string());
            fields.insert(SnapshotField::DayOccurrences, join(day_occurrences));
            fields.insert(SnapshotField::DaysOfWeek, join(days_of_week));
        }
        MonthlySchedule::Monthday { days_of_month } => {
            fields.insert(SnapshotField::ScheduleType, "monthday".to_string());
            fields.insert(SnapshotField::DaysOfMonth, join(days_of_month));
        }
    }
}

fn custom_dates(dates: &[Occurrence]) -> String {
    join(
        dates
            .iter()
            .map(|o| format!("{}/{}", o.start.to_rfc3339(), o.end.to_rfc3339())),
    )
}

fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Items of a raw list field: a JSON array or a comma separated string.
fn raw_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar).collect(),
        other => scalar(other)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn normalize_raw(field: SnapshotField, value: &Value) -> Option<String> {
    if value.is_null() {
        return None;
    }

    let normalized = match field {
        SnapshotField::StartDate | SnapshotField::EndDate => normalize_date(&scalar(value)?),
        SnapshotField::Time | SnapshotField::EndTime => normalize_time(&scalar(value)?),
        SnapshotField::DaysOfWeek => normalize_set::<DayOfWeek>(value),
        SnapshotField::DayOccurrences => normalize_set::<DayOccurrence>(value),
        SnapshotField::Months => normalize_set::<Month>(value),
        SnapshotField::DaysOfMonth => normalize_set::<i8>(value),
        SnapshotField::ExcludedDates | SnapshotField::IncludedDates => {
            join(raw_items(value).iter().map(|item| normalize_date(item)))
        }
        SnapshotField::ScheduleType => scalar(value)?.to_ascii_lowercase(),
        SnapshotField::Timezone
        | SnapshotField::Duration
        | SnapshotField::YearInterval
        | SnapshotField::SlotDuration
        | SnapshotField::SlotBuffer
        | SnapshotField::CustomDates => scalar(value)?,
    };
    Some(normalized)
}

/// Reduces a date or date-time string to `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return date.format(DATE_FORMAT).to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return datetime.date().format(DATE_FORMAT).to_string();
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return datetime.date_naive().format(DATE_FORMAT).to_string();
    }
    tracing::trace!(raw, "Keeping unparsable date verbatim");
    raw.to_string()
}

fn normalize_time(raw: &str) -> String {
    ["%H:%M:%S", "%H:%M"]
        .into_iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map_or_else(|| raw.to_string(), |time| time.format(TIME_FORMAT).to_string())
}

/// Parses every item as `T` and writes them in `T`'s order. Falls back to the
/// sorted raw items if any item does not parse.
fn normalize_set<T>(value: &Value) -> String
where
    T: DeserializeOwned + Ord + Display,
{
    let items = raw_items(value);
    let parsed: Option<BTreeSet<T>> = items.iter().map(|item| parse_item(item)).collect();

    if let Some(set) = parsed {
        return join(set);
    }
    let mut items = items;
    items.sort();
    items.dedup();
    items.join(",")
}

fn parse_item<T: DeserializeOwned>(item: &str) -> Option<T> {
    let value = item
        .parse::<i64>()
        .map_or_else(|_e| Value::String(item.to_ascii_lowercase()), Value::from);
    serde_json::from_value(value).ok()
}
