//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10, §3.8.5.3).

use std::fmt;

use super::DateValue;

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Maps a `chrono` weekday onto the iCalendar one.
    #[must_use]
    pub const fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number.
///
/// Used in BYDAY rule part. Examples:
/// - `MO` - every Monday
/// - `1MO` - first Monday of the month/year
/// - `-1FR` - last Friday of the month/year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// Returns `None` if ordinal is 0 or outside the range -53..=53.
    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Option<Self> {
        (ordinal != 0 && (-53..=53).contains(&ordinal)).then_some(Self {
            ordinal: Some(ordinal),
            weekday,
        })
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Every rule part RFC 5545 defines is captured, including the ones a
/// consumer may not be able to honour, so the consumer can decide to reject
/// them instead of silently losing them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RRule {
    /// Recurrence frequency (required).
    pub freq: Option<Frequency>,

    /// Recurrence interval (default: 1).
    pub interval: Option<u32>,

    /// End date/time of the recurrence (mutually exclusive with count).
    pub until: Option<DateValue>,

    /// Number of occurrences (mutually exclusive with until).
    pub count: Option<u32>,

    /// Week start day (default: Monday).
    pub wkst: Option<Weekday>,

    /// By-second list (0-60, 60 for leap second).
    pub by_second: Vec<u8>,

    /// By-minute list (0-59).
    pub by_minute: Vec<u8>,

    /// By-hour list (0-23).
    pub by_hour: Vec<u8>,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<WeekdayNum>,

    /// By-monthday list (-31 to 31, excluding 0).
    pub by_monthday: Vec<i8>,

    /// By-yearday list (-366 to 366, excluding 0).
    pub by_yearday: Vec<i16>,

    /// By-weekno list (-53 to 53, excluding 0, ISO 8601).
    pub by_weekno: Vec<i8>,

    /// By-month list (1-12).
    pub by_month: Vec<u8>,

    /// By-setpos list (-366 to 366, excluding 0).
    pub by_setpos: Vec<i16>,
}

impl RRule {
    /// Creates a rule with the given frequency and nothing else set.
    #[must_use]
    pub fn with_frequency(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the count.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None; // Mutually exclusive
        self
    }

    /// Sets the until boundary.
    #[must_use]
    pub fn with_until(mut self, until: DateValue) -> Self {
        self.until = Some(until);
        self.count = None; // Mutually exclusive
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-monthday list.
    #[must_use]
    pub fn with_by_monthday(mut self, days: Vec<i8>) -> Self {
        self.by_monthday = days;
        self
    }

    /// Sets the by-month list.
    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    /// Returns the names of rule parts that are set, in serialization order.
    #[must_use]
    pub fn present_parts(&self) -> Vec<&'static str> {
        let mut parts = Vec::new();
        let flags = [
            ("FREQ", self.freq.is_some()),
            ("INTERVAL", self.interval.is_some()),
            ("UNTIL", self.until.is_some()),
            ("COUNT", self.count.is_some()),
            ("WKST", self.wkst.is_some()),
            ("BYSECOND", !self.by_second.is_empty()),
            ("BYMINUTE", !self.by_minute.is_empty()),
            ("BYHOUR", !self.by_hour.is_empty()),
            ("BYDAY", !self.by_day.is_empty()),
            ("BYMONTHDAY", !self.by_monthday.is_empty()),
            ("BYYEARDAY", !self.by_yearday.is_empty()),
            ("BYWEEKNO", !self.by_weekno.is_empty()),
            ("BYMONTH", !self.by_month.is_empty()),
            ("BYSETPOS", !self.by_setpos.is_empty()),
        ];
        for (name, present) in flags {
            if present {
                parts.push(name);
            }
        }
        parts
    }
}

fn join_list<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if let Some(ref freq) = self.freq {
            parts.push(format!("FREQ={freq}"));
        }

        if let Some(interval) = self.interval
            && interval != 1
        {
            parts.push(format!("INTERVAL={interval}"));
        }

        if let Some(ref until) = self.until {
            parts.push(format!("UNTIL={until}"));
        }

        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }

        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }

        let lists = [
            ("BYSECOND", join_list(&self.by_second)),
            ("BYMINUTE", join_list(&self.by_minute)),
            ("BYHOUR", join_list(&self.by_hour)),
            ("BYDAY", join_list(&self.by_day)),
            ("BYMONTHDAY", join_list(&self.by_monthday)),
            ("BYYEARDAY", join_list(&self.by_yearday)),
            ("BYWEEKNO", join_list(&self.by_weekno)),
            ("BYMONTH", join_list(&self.by_month)),
            ("BYSETPOS", join_list(&self.by_setpos)),
        ];
        for (name, joined) in lists {
            if !joined.is_empty() {
                parts.push(format!("{name}={joined}"));
            }
        }

        write!(f, "{}", parts.join(";"))
    }
}
