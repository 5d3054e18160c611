//! RFC 5545 recurrence exchange for cadence: RRULE/EXDATE text parsing and
//! serialization, timezone resolution.

pub mod rfc;
