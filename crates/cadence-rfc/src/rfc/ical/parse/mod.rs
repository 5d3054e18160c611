//! Parsers for the recurrence lines of iCalendar content.

mod error;
mod recurrence;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use recurrence::parse_recurrence;
pub use values::{parse_date, parse_date_value, parse_rrule};
