//! Recurrence engine for cadence: expands recurring series into concrete
//! occurrences and keeps their generated instances in step with the series.

pub mod error;
pub mod recurrence;
