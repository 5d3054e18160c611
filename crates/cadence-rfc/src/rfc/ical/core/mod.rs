//! iCalendar core models (RFC 5545) needed to exchange recurrence data.
//!
//! Only the recurrence-related value types are modelled: the RECUR value of
//! an RRULE line and the DATE / DATE-TIME values used by DTSTART, UNTIL and
//! EXDATE.

mod recurrence;
mod rrule;
mod value;

pub use recurrence::RecurrenceText;
pub use rrule::{Frequency, RRule, Weekday, WeekdayNum};
pub use value::{DateValue, ZonedValue};
