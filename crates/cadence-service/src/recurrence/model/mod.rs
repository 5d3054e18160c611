//! Recurrence value objects.

pub mod calendar;
pub mod occurrence;
pub mod rule;

pub use calendar::{DayOccurrence, DayOfWeek, LAST_DAY_OF_MONTH, Month};
pub use occurrence::Occurrence;
pub use rule::{
    EventLength, MonthlySchedule, RecurrenceKind, RecurrencePattern, RecurrenceRule,
    SeriesDocument, SlotLength, SlotUnit,
};
