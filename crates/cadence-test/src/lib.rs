//! Cadence recurrence engine - integration test support.
//!
//! Re-exports the workspace crates under one root and provides an in-memory
//! [`InstanceStore`] so tests can drive the full series lifecycle without a
//! persistence layer.

use std::collections::BTreeMap;

pub use cadence_core as core;
pub use cadence_rfc as rfc;
pub use cadence_service::recurrence;

use cadence_service::recurrence::model::Occurrence;
use cadence_service::recurrence::reconcile::InstanceStore;
use chrono::{NaiveDate, NaiveDateTime};

/// Generated instances held in memory, keyed by a sequential id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    instances: BTreeMap<u64, Occurrence>,
    next_id: u64,
    /// Instances that refuse to be deleted, as if locked by an editor.
    pub locked: Vec<u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn ids(&self) -> Vec<u64> {
        self.instances.keys().copied().collect()
    }

    /// Stored occurrences in id order.
    #[must_use]
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.instances.values().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl InstanceStore for MemoryStore {
    type Id = u64;
    type Error = String;

    fn delete(&mut self, id: &u64) -> Result<(), String> {
        if self.locked.contains(id) {
            return Err(format!("instance {id} is locked"));
        }
        self.instances
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| format!("instance {id} does not exist"))
    }

    fn create(&mut self, occurrence: &Occurrence) -> Result<u64, String> {
        self.next_id += 1;
        self.instances.insert(self.next_id, *occurrence);
        Ok(self.next_id)
    }
}

/// Parses a compact local date-time such as `20260105T090000`.
///
/// ## Panics
/// Panics if `value` is not in that form; test data only.
#[must_use]
#[expect(clippy::expect_used)]
pub fn compact_local(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").expect("compact local date-time")
}

/// ## Panics
/// Panics if `value` is not `YYYY-MM-DD`; test data only.
#[must_use]
#[expect(clippy::expect_used)]
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("ISO date")
}
