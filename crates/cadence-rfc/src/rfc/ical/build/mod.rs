//! iCalendar serialization of recurrence lines (RFC 5545).

mod serializer;

pub use serializer::{serialize_recurrence, serialize_zoned};
