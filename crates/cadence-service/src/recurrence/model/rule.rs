//! The recurrence rule value object.

use std::collections::BTreeSet;
use std::fmt;

use cadence_rfc::rfc::ical::localize;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::calendar::{DayOccurrence, DayOfWeek, Month};
use super::occurrence::Occurrence;

/// A complete recurrence configuration for one series.
///
/// `range_start` and `range_end` are wall-clock date-times in `timezone`;
/// generation walks their calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub timezone: Tz,
    pub range_start: NaiveDateTime,
    pub range_end: NaiveDateTime,
    pub pattern: RecurrencePattern,
}

/// Kind-specific parameters of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily {
        time: NaiveTime,
        duration_seconds: u32,
    },
    Weekly {
        time: NaiveTime,
        length: EventLength,
        days_of_week: BTreeSet<DayOfWeek>,
    },
    Monthly {
        time: NaiveTime,
        length: EventLength,
        schedule: MonthlySchedule,
    },
    Yearly {
        time: NaiveTime,
        length: EventLength,
        schedule: MonthlySchedule,
        year_interval: u32,
        months: BTreeSet<Month>,
    },
    /// Back-to-back slots within each day of the range.
    Consecutive {
        time: NaiveTime,
        end_time: NaiveTime,
        duration: SlotLength,
        buffer: SlotLength,
    },
    /// Explicit occurrences, passed through as given.
    Custom { dates: Vec<Occurrence> },
}

/// How the end of each occurrence is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLength {
    /// Seconds after the start.
    Duration(u32),
    /// Wall-clock time on the start's calendar date.
    EndTime(NaiveTime),
}

/// Which days of a month a monthly or yearly rule selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schedule_type", rename_all = "snake_case")]
pub enum MonthlySchedule {
    /// Every `day_occurrences` x `days_of_week` combination, e.g. "first and
    /// last Tuesday".
    Weekday {
        day_occurrences: BTreeSet<DayOccurrence>,
        days_of_week: BTreeSet<DayOfWeek>,
    },
    /// Fixed days of the month; `-1` is the last day.
    Monthday { days_of_month: BTreeSet<i8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotUnit {
    Minute,
    Hour,
}

/// A length expressed in minutes or hours, as the consecutive slot form takes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLength {
    pub amount: u32,
    pub unit: SlotUnit,
}

impl SlotLength {
    #[must_use]
    pub const fn minutes(amount: u32) -> Self {
        Self {
            amount,
            unit: SlotUnit::Minute,
        }
    }

    #[must_use]
    pub const fn hours(amount: u32) -> Self {
        Self {
            amount,
            unit: SlotUnit::Hour,
        }
    }

    #[must_use]
    pub fn as_delta(self) -> TimeDelta {
        match self.unit {
            SlotUnit::Minute => TimeDelta::minutes(i64::from(self.amount)),
            SlotUnit::Hour => TimeDelta::hours(i64::from(self.amount)),
        }
    }
}

impl fmt::Display for SlotLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            SlotUnit::Minute => write!(f, "{} minute(s)", self.amount),
            SlotUnit::Hour => write!(f, "{} hour(s)", self.amount),
        }
    }
}

/// The closed set of recurrence kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Consecutive,
    Custom,
}

impl RecurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Consecutive => "consecutive",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecurrencePattern {
    #[must_use]
    pub const fn kind(&self) -> RecurrenceKind {
        match self {
            Self::Daily { .. } => RecurrenceKind::Daily,
            Self::Weekly { .. } => RecurrenceKind::Weekly,
            Self::Monthly { .. } => RecurrenceKind::Monthly,
            Self::Yearly { .. } => RecurrenceKind::Yearly,
            Self::Consecutive { .. } => RecurrenceKind::Consecutive,
            Self::Custom { .. } => RecurrenceKind::Custom,
        }
    }

    /// Start time of each occurrence, for the kinds that have one.
    #[must_use]
    pub const fn time(&self) -> Option<NaiveTime> {
        match self {
            Self::Daily { time, .. }
            | Self::Weekly { time, .. }
            | Self::Monthly { time, .. }
            | Self::Yearly { time, .. }
            | Self::Consecutive { time, .. } => Some(*time),
            Self::Custom { .. } => None,
        }
    }

    /// Occurrence length, for the kinds with a single length setting.
    #[must_use]
    pub const fn length(&self) -> Option<EventLength> {
        match self {
            Self::Daily {
                duration_seconds, ..
            } => Some(EventLength::Duration(*duration_seconds)),
            Self::Weekly { length, .. }
            | Self::Monthly { length, .. }
            | Self::Yearly { length, .. } => Some(*length),
            Self::Consecutive { .. } | Self::Custom { .. } => None,
        }
    }
}

impl RecurrenceRule {
    #[must_use]
    pub const fn kind(&self) -> RecurrenceKind {
        self.pattern.kind()
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.range_start.date()
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.range_end.date()
    }

    /// `true` when the range ends before it starts, including later on the
    /// same day; such rules generate nothing.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.range_start > self.range_end
    }

    /// Both ends of the range converted to UTC.
    #[must_use]
    pub fn range_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            localize(self.timezone, self.range_start),
            localize(self.timezone, self.range_end),
        )
    }
}

/// A rule together with the plain dates that subtract from or add to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDocument {
    pub rule: RecurrenceRule,
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub included_dates: Vec<NaiveDate>,
}

impl SeriesDocument {
    #[must_use]
    pub fn new(rule: RecurrenceRule) -> Self {
        Self {
            rule,
            excluded_dates: Vec::new(),
            included_dates: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn weekly_rule() -> RecurrenceRule {
        RecurrenceRule {
            timezone: Tz::America__Detroit,
            range_start: NaiveDate::from_ymd_opt(2022, 7, 19)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            range_end: NaiveDate::from_ymd_opt(2022, 8, 2)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            pattern: RecurrencePattern::Weekly {
                time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                length: EventLength::Duration(3600),
                days_of_week: BTreeSet::from([DayOfWeek::Tuesday]),
            },
        }
    }

    #[test]
    fn range_utc_converts_both_ends() {
        let (start, end) = weekly_rule().range_utc();
        assert_eq!(start, Utc.with_ymd_and_hms(2022, 7, 19, 16, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2022, 8, 2, 18, 0, 0).unwrap());
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(weekly_rule()).unwrap();
        assert_eq!(json["timezone"], "America/Detroit");
        assert_eq!(json["pattern"]["type"], "weekly");
        assert_eq!(json["pattern"]["length"]["duration"], 3600);
        assert_eq!(json["pattern"]["days_of_week"][0], "tuesday");

        let back: RecurrenceRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, weekly_rule());
    }

    #[test]
    fn monthly_schedule_json_shape() {
        let schedule = MonthlySchedule::Monthday {
            days_of_month: BTreeSet::from([1, -1]),
        };
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["schedule_type"], "monthday");
        assert_eq!(json["days_of_month"], serde_json::json!([-1, 1]));
    }

    #[test]
    fn pattern_accessors() {
        let rule = weekly_rule();
        assert_eq!(rule.kind(), RecurrenceKind::Weekly);
        assert_eq!(rule.pattern.time(), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(rule.pattern.length(), Some(EventLength::Duration(3600)));
        assert!(!rule.is_inverted());
    }

    #[test]
    fn slot_length_delta() {
        assert_eq!(SlotLength::minutes(15).as_delta(), TimeDelta::minutes(15));
        assert_eq!(SlotLength::hours(2).as_delta(), TimeDelta::hours(2));
        assert_eq!(SlotLength::hours(2).to_string(), "2 hour(s)");
    }
}
