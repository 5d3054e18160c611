//! Timezone resolution and UTC conversion for recurrence date-times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

/// Error during timezone conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Resolver for timezone identifiers.
///
/// Maintains a cache of resolved timezones keyed by the TZID as written.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// IANA names are accepted directly; Windows names, IANA aliases and the
    /// vendor prefixes some calendar clients add are normalized first.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        // Exact IANA names are kept as written; ICU would canonicalize UTC to Etc/UTC
        let tz = Tz::from_str(tzid)
            .or_else(|_e| Tz::from_str(&normalize_tzid(tzid)))
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common CalDAV/iCalendar timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    // Windows names first ("Eastern Standard Time")
    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // IANA aliases (Europe/Kiev -> Europe/Kyiv)
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Converts a local datetime in an already resolved timezone to UTC.
///
/// This never fails: a time inside a DST gap is shifted forward by one hour,
/// and a time inside a fold resolves to its first occurrence.
#[must_use]
pub fn localize(tz: Tz, local_time: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local_time) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = local_time + TimeDelta::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                    tracing::trace!(%local_time, %tz, "Shifted local time out of DST gap");
                    dt.with_timezone(&Utc)
                }
                LocalResult::None => {
                    // Gaps longer than an hour: apply the offset in force at that instant
                    let offset = tz.offset_from_utc_datetime(&local_time).fix();
                    let utc = local_time - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
                    utc.and_utc()
                }
            }
        }
    }
}

/// Returns the wall-clock time of a UTC instant in the given timezone.
#[must_use]
pub fn to_local(tz: Tz, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}
