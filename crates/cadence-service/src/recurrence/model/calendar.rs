//! Calendar vocabulary used by recurrence rules: weekdays, months and the
//! "which week of the month" selector.

use std::fmt;

use cadence_rfc::rfc::ical::Weekday as IcalWeekday;
use serde::{Deserialize, Serialize};

/// Marker used in `days_of_month` for "the last day of the month".
pub const LAST_DAY_OF_MONTH: i8 = -1;

/// Day of the week, ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    #[must_use]
    pub const fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }

    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
            Self::Sunday => chrono::Weekday::Sun,
        }
    }

    #[must_use]
    pub const fn from_ical(day: IcalWeekday) -> Self {
        match day {
            IcalWeekday::Monday => Self::Monday,
            IcalWeekday::Tuesday => Self::Tuesday,
            IcalWeekday::Wednesday => Self::Wednesday,
            IcalWeekday::Thursday => Self::Thursday,
            IcalWeekday::Friday => Self::Friday,
            IcalWeekday::Saturday => Self::Saturday,
            IcalWeekday::Sunday => Self::Sunday,
        }
    }

    #[must_use]
    pub const fn to_ical(self) -> IcalWeekday {
        IcalWeekday::from_chrono(self.to_chrono())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Month of the year, written as its three-letter abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jan => "jan",
            Self::Feb => "feb",
            Self::Mar => "mar",
            Self::Apr => "apr",
            Self::May => "may",
            Self::Jun => "jun",
            Self::Jul => "jul",
            Self::Aug => "aug",
            Self::Sep => "sep",
            Self::Oct => "oct",
            Self::Nov => "nov",
            Self::Dec => "dec",
        }
    }

    /// Month number, 1 for January.
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    #[must_use]
    pub fn from_number(number: u32) -> Option<Self> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which occurrence of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOccurrence {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl DayOccurrence {
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Last,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
            Self::Fourth => "fourth",
            Self::Last => "last",
        }
    }

    /// RFC 5545 BYDAY ordinal: 1..=4, or -1 for the last.
    #[must_use]
    pub const fn ordinal(self) -> i8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }

    #[must_use]
    pub const fn from_ordinal(ordinal: i8) -> Option<Self> {
        match ordinal {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            -1 => Some(Self::Last),
            _ => None,
        }
    }
}

impl fmt::Display for DayOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
