//! Parser for the DTSTART / RRULE / EXDATE lines of a recurring series.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::values::{parse_date_value, parse_rrule};
use crate::rfc::ical::core::{RecurrenceText, ZonedValue};

const RECURRENCE_PROPERTIES: [&str; 3] = ["DTSTART", "RRULE", "EXDATE"];

/// ## Summary
/// Parses recurrence text into its DTSTART, RRULE and EXDATE parts.
///
/// Accepted shapes, in any combination of lines:
/// - a bare rule: `FREQ=WEEKLY;BYDAY=TU`
/// - content lines: `RRULE:...`, `DTSTART;TZID=...:...`, `EXDATE[;TZID=...]:a,b`
/// - `EXDATE=a,b` written as an extra part of the rule itself
///
/// ## Errors
/// Returns an error naming the offending token if any line or rule part is
/// malformed, if there is no rule, or if there is more than one.
pub fn parse_recurrence(text: &str) -> ParseResult<RecurrenceText> {
    let mut result = RecurrenceText::default();
    let mut rule_seen = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let head_end = line.find([':', ';']).unwrap_or(line.len());
        let name = line[..head_end].to_ascii_uppercase();

        if !RECURRENCE_PROPERTIES.contains(&name.as_str()) {
            if name.contains('=') {
                parse_rule_line(line, &mut result, &mut rule_seen)?;
                continue;
            }
            return Err(ParseError::new(ParseErrorKind::UnknownProperty, name));
        }

        let (head, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, name.clone()))?;
        let tzid = tzid_param(head);

        match name.as_str() {
            "RRULE" => parse_rule_line(value, &mut result, &mut rule_seen)?,
            "DTSTART" => {
                let value = parse_date_value(value, "DTSTART")?;
                result.dtstart = Some(ZonedValue::new(value, tzid));
            }
            _ => push_exdates(&mut result, value, tzid)?,
        }
    }

    if !rule_seen {
        return Err(ParseError::new(ParseErrorKind::MissingFrequency, "RRULE"));
    }

    Ok(result)
}

/// Splits `EXDATE=` parts out of a rule line and parses the remainder.
fn parse_rule_line(
    line: &str,
    result: &mut RecurrenceText,
    rule_seen: &mut bool,
) -> ParseResult<()> {
    if *rule_seen {
        return Err(ParseError::new(ParseErrorKind::MultipleRules, "RRULE"));
    }
    *rule_seen = true;

    let mut rule_parts = Vec::new();
    for part in line.split(';') {
        match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("EXDATE") => {
                push_exdates(result, value, None)?;
            }
            _ => rule_parts.push(part),
        }
    }

    result.rrule = parse_rrule(&rule_parts.join(";"))?;
    Ok(())
}

fn push_exdates(
    result: &mut RecurrenceText,
    value: &str,
    tzid: Option<String>,
) -> ParseResult<()> {
    for raw in value.split(',').map(str::trim) {
        if raw.is_empty() {
            return Err(ParseError::new(ParseErrorKind::EmptyValue, "EXDATE"));
        }
        let parsed = parse_date_value(raw, "EXDATE")?;
        result.exdates.push(ZonedValue::new(parsed, tzid.clone()));
    }
    Ok(())
}

/// Extracts the `TZID` parameter from a content line head such as
/// `DTSTART;VALUE=DATE-TIME;TZID="America/New_York"`.
fn tzid_param(head: &str) -> Option<String> {
    head.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("TZID")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}
