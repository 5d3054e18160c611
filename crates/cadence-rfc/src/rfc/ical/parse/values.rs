//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! Error sources are discarded during parsing (`map_err_ignore`); the error
//! carries the offending token and value instead.
#![expect(
    clippy::map_err_ignore,
    reason = "Value parsers report the rejected token and value instead of the source error"
)]

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{DateValue, Frequency, RRule, Weekday, WeekdayNum};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, token: &str) -> ParseResult<NaiveDate> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDate, token).with_context(s);

    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = s[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = s[4..6].parse::<u32>().map_err(|_| invalid())?;
    let day = s[6..8].parse::<u32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses a TIME value without the UTC designator (RFC 5545 §3.3.12).
fn parse_time(s: &str, token: &str, raw: &str) -> ParseResult<NaiveTime> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidDateTime, token).with_context(raw);

    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hour = s[0..2].parse::<u32>().map_err(|_| invalid())?;
    let minute = s[2..4].parse::<u32>().map_err(|_| invalid())?;
    let second = s[4..6].parse::<u32>().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}

/// Parses a DATE or DATE-TIME value (RFC 5545 §3.3.4, §3.3.5).
///
/// Accepts `YYYYMMDD`, `YYYYMMDDTHHMMSS` and `YYYYMMDDTHHMMSSZ`.
///
/// ## Errors
/// Returns an error if the string matches none of the three forms.
pub fn parse_date_value(s: &str, token: &str) -> ParseResult<DateValue> {
    let s = s.trim();
    let Some((date_part, time_part)) = s.split_once(['T', 't']) else {
        return parse_date(s, token).map(DateValue::Date);
    };

    let date = parse_date(date_part, token)
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidDateTime, token).with_context(s))?;

    if let Some(time_part) = time_part.strip_suffix(['Z', 'z']) {
        let time = parse_time(time_part, token, s)?;
        Ok(DateValue::Utc(NaiveDateTime::new(date, time).and_utc()))
    } else {
        let time = parse_time(time_part, token, s)?;
        Ok(DateValue::Floating(NaiveDateTime::new(date, time)))
    }
}

/// Parses a RECUR (RRULE) value (RFC 5545 §3.3.10).
///
/// ## Errors
/// Returns an error naming the offending rule part if any part is malformed,
/// unknown, repeated, or if FREQ is missing.
pub fn parse_rrule(s: &str) -> ParseResult<RRule> {
    let mut rrule = RRule::default();
    let mut seen = HashSet::new();

    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidRulePart, part))?;

        let key = key.trim().to_ascii_uppercase();
        if !seen.insert(key.clone()) {
            return Err(ParseError::new(ParseErrorKind::DuplicateRulePart, key));
        }

        parse_rrule_part(&mut rrule, &key, value.trim())?;
    }

    if rrule.freq.is_none() {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, "FREQ"));
    }

    Ok(rrule)
}

/// Parses a single RRULE key-value pair.
fn parse_rrule_part(rrule: &mut RRule, key: &str, value: &str) -> ParseResult<()> {
    if value.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyValue, key));
    }

    match key {
        "FREQ" => {
            rrule.freq = Some(Frequency::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidFrequency, key).with_context(value)
            })?);
        }
        "INTERVAL" => rrule.interval = Some(parse_positive(key, value)?),
        "COUNT" => {
            if rrule.until.is_some() {
                return Err(ParseError::new(ParseErrorKind::UntilCountConflict, key));
            }
            rrule.count = Some(parse_positive(key, value)?);
        }
        "UNTIL" => {
            if rrule.count.is_some() {
                return Err(ParseError::new(ParseErrorKind::UntilCountConflict, key));
            }
            rrule.until = Some(parse_date_value(value, key)?);
        }
        "WKST" => {
            rrule.wkst = Some(Weekday::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, key).with_context(value)
            })?);
        }
        "BYSECOND" => rrule.by_second = parse_list(key, value)?,
        "BYMINUTE" => rrule.by_minute = parse_list(key, value)?,
        "BYHOUR" => rrule.by_hour = parse_list(key, value)?,
        "BYDAY" => rrule.by_day = parse_byday(key, value)?,
        "BYMONTHDAY" => rrule.by_monthday = parse_list(key, value)?,
        "BYYEARDAY" => rrule.by_yearday = parse_list(key, value)?,
        "BYWEEKNO" => rrule.by_weekno = parse_list(key, value)?,
        "BYMONTH" => rrule.by_month = parse_list(key, value)?,
        "BYSETPOS" => rrule.by_setpos = parse_list(key, value)?,
        _ => {
            return Err(ParseError::new(ParseErrorKind::UnknownRulePart, key).with_context(value));
        }
    }
    Ok(())
}

/// Parses a strictly positive integer.
fn parse_positive(key: &str, value: &str) -> ParseResult<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::new(ParseErrorKind::InvalidInteger, key).with_context(value)),
    }
}

/// Parses a comma-separated list of integers.
fn parse_list<T: FromStr>(key: &str, value: &str) -> ParseResult<Vec<T>> {
    value
        .split(',')
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| ParseError::new(ParseErrorKind::InvalidInteger, key).with_context(v))
        })
        .collect()
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(key: &str, value: &str) -> ParseResult<Vec<WeekdayNum>> {
    value
        .split(',')
        .map(|v| parse_weekday_num(key, v.trim()))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(key: &str, s: &str) -> ParseResult<WeekdayNum> {
    let invalid = || ParseError::new(ParseErrorKind::InvalidWeekday, key).with_context(s);

    // The weekday is always the last two characters
    if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
        return Err(invalid());
    }

    let (ordinal_str, weekday_str) = s.split_at(s.len() - 2);
    let weekday = Weekday::parse(weekday_str).ok_or_else(invalid)?;

    if ordinal_str.is_empty() {
        return Ok(WeekdayNum::every(weekday));
    }

    let ordinal = ordinal_str
        .trim_start_matches('+')
        .parse::<i8>()
        .map_err(|_| invalid())?;
    WeekdayNum::nth(ordinal, weekday).ok_or_else(invalid)
}
