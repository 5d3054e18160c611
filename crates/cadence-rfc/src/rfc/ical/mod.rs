//! iCalendar RFC 5545 recurrence support.
//!
//! - `core`: RRULE and date value types
//! - `parse`: parsers for DTSTART / RRULE / EXDATE text
//! - `build`: serializers for the same lines
//! - `timezone`: TZID resolution and local/UTC conversion
//!
//! ## Example
//!
//! ```rust
//! use cadence_rfc::rfc::ical::{parse_recurrence, serialize_recurrence};
//!
//! let parsed = parse_recurrence("FREQ=WEEKLY;BYDAY=TU;UNTIL=20220802T140000").unwrap();
//! assert_eq!(
//!     serialize_recurrence(&parsed),
//!     "RRULE:FREQ=WEEKLY;UNTIL=20220802T140000;BYDAY=TU\r\n"
//! );
//! ```

pub mod build;
pub mod core;
pub mod parse;
pub mod timezone;

pub use build::serialize_recurrence;
pub use core::{DateValue, Frequency, RRule, RecurrenceText, Weekday, WeekdayNum, ZonedValue};
pub use parse::{ParseError, ParseErrorKind, ParseResult, parse_recurrence};
pub use timezone::{TimeZoneResolver, localize, to_local};
