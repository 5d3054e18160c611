//! Configuration differ deciding whether a series must be regenerated.

pub mod snapshot;

use serde::Serialize;

use crate::recurrence::model::SeriesDocument;

pub use snapshot::{ConfigSnapshot, SnapshotField};

/// Key reported when the recurrence kind itself changed.
pub const TYPE_FIELD: &str = "type";

/// One differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub field: &'static str,
    pub label: &'static str,
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Differing fields in declaration order. Empty means nothing to regenerate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigDiff {
    entries: Vec<DiffEntry>,
}

impl ConfigDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&DiffEntry> {
        self.entries.iter().find(|entry| entry.field == field)
    }

    #[must_use]
    pub fn type_changed(&self) -> bool {
        self.get(TYPE_FIELD).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ConfigDiff {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// ## Summary
/// Reports the fields whose values differ between two snapshots.
///
/// The kind is compared first; if it changed, the result is that single entry
/// and no field of the incompatible shapes is compared.
#[must_use]
pub fn diff(previous: &ConfigSnapshot, next: &ConfigSnapshot) -> ConfigDiff {
    if previous.kind != next.kind {
        tracing::debug!(previous = %previous.kind, next = %next.kind, "Recurrence type changed");
        return ConfigDiff {
            entries: vec![DiffEntry {
                field: TYPE_FIELD,
                label: "Recurrence type",
                previous: Some(previous.kind.clone()),
                next: Some(next.kind.clone()),
            }],
        };
    }

    let entries: Vec<DiffEntry> = SnapshotField::ALL
        .into_iter()
        .filter_map(|field| {
            let before = previous.fields.get(&field);
            let after = next.fields.get(&field);
            (before != after).then(|| DiffEntry {
                field: field.as_str(),
                label: field.label(),
                previous: before.cloned(),
                next: after.cloned(),
            })
        })
        .collect();

    tracing::debug!(changed = entries.len(), "Compared recurrence configuration");
    ConfigDiff { entries }
}

/// Diffs two series documents through their snapshots.
#[must_use]
pub fn diff_series(previous: &SeriesDocument, next: &SeriesDocument) -> ConfigDiff {
    diff(
        &ConfigSnapshot::from_series(previous),
        &ConfigSnapshot::from_series(next),
    )
}
