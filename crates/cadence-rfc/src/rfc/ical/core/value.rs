//! DATE and DATE-TIME values (RFC 5545 §3.3.4, §3.3.5).

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A DATE or DATE-TIME value in one of its three forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// `YYYYMMDD`
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSS`, interpreted in the surrounding timezone.
    Floating(NaiveDateTime),
    /// `YYYYMMDDTHHMMSSZ`
    Utc(DateTime<Utc>),
}

impl DateValue {
    /// Returns the calendar date written in the value, ignoring any time.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::Floating(dt) => dt.date(),
            Self::Utc(dt) => dt.date_naive(),
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y%m%d")),
            Self::Floating(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%S")),
            Self::Utc(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%SZ")),
        }
    }
}

/// A date value together with the `TZID` parameter it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedValue {
    pub value: DateValue,
    pub tzid: Option<String>,
}

impl ZonedValue {
    #[must_use]
    pub fn new(value: DateValue, tzid: Option<String>) -> Self {
        Self { value, tzid }
    }
}
