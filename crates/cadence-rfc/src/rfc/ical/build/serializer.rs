//! Recurrence serializer (RFC 5545).
//!
//! Emits DTSTART, RRULE and EXDATE content lines in that order, CRLF
//! terminated.

use crate::rfc::ical::core::{DateValue, RecurrenceText, ZonedValue};

/// Serializes the recurrence lines of a series.
#[must_use]
pub fn serialize_recurrence(recurrence: &RecurrenceText) -> String {
    let mut result = String::new();

    if let Some(dtstart) = &recurrence.dtstart {
        result.push_str(&serialize_zoned("DTSTART", dtstart));
        result.push_str("\r\n");
    }

    result.push_str("RRULE:");
    result.push_str(&recurrence.rrule.to_string());
    result.push_str("\r\n");

    for exdate in &recurrence.exdates {
        result.push_str(&serialize_zoned("EXDATE", exdate));
        result.push_str("\r\n");
    }

    result
}

/// Serializes a single date property line without its terminator.
///
/// The `TZID` parameter is only written for floating values; DATE values get
/// `VALUE=DATE` and UTC values carry their own designator.
#[must_use]
pub fn serialize_zoned(name: &str, zoned: &ZonedValue) -> String {
    match (&zoned.value, zoned.tzid.as_deref()) {
        (DateValue::Floating(_), Some(tzid)) => format!("{name};TZID={tzid}:{}", zoned.value),
        (DateValue::Date(_), _) => format!("{name};VALUE=DATE:{}", zoned.value),
        _ => format!("{name}:{}", zoned.value),
    }
}
