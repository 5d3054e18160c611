//! The recurrence-related lines of a VEVENT, as exchanged on import/export.

use super::{RRule, ZonedValue};

/// Parsed `DTSTART`, `RRULE` and `EXDATE` lines of a single series.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecurrenceText {
    pub dtstart: Option<ZonedValue>,
    pub rrule: RRule,
    pub exdates: Vec<ZonedValue>,
}
