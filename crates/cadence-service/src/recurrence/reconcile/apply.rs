use std::fmt;

use serde::Serialize;

use super::ReconcilePlan;
use crate::recurrence::model::Occurrence;

/// Persistence for the instances generated from a series.
pub trait InstanceStore {
    type Id: Ord + fmt::Debug;
    type Error: fmt::Display;

    /// ## Errors
    /// Returns the store's error if the instance could not be deleted.
    fn delete(&mut self, id: &Self::Id) -> Result<(), Self::Error>;

    /// ## Errors
    /// Returns the store's error if the instance could not be created.
    fn create(&mut self, occurrence: &Occurrence) -> Result<Self::Id, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyAction {
    Delete,
    Create,
}

/// A single step that failed; the rest of the plan still ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyFailure {
    pub action: ApplyAction,
    pub target: String,
    pub reason: String,
}

/// Counts of what an applied plan actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport<Id> {
    pub deleted: usize,
    pub delete_total: usize,
    pub created: usize,
    pub create_total: usize,
    pub created_ids: Vec<Id>,
    pub failures: Vec<ApplyFailure>,
}

impl<Id> ApplyReport<Id> {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<Id> fmt::Display for ApplyReport<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deleted {} of {} instances, created {} of {} instances",
            self.deleted, self.delete_total, self.created, self.create_total
        )
    }
}

/// ## Summary
/// Runs a plan's deletes, then its creates, against `store`.
///
/// Each step is independent: a failed delete or create is recorded and the
/// remaining steps still run.
///
/// ## Side Effects
/// Deletes and creates instances in `store`.
pub fn apply_plan<S: InstanceStore>(
    plan: &ReconcilePlan<S::Id>,
    store: &mut S,
) -> ApplyReport<S::Id> {
    let mut report = ApplyReport {
        deleted: 0,
        delete_total: plan.to_delete.len(),
        created: 0,
        create_total: plan.to_create.len(),
        created_ids: Vec::with_capacity(plan.to_create.len()),
        failures: Vec::new(),
    };

    for id in &plan.to_delete {
        match store.delete(id) {
            Ok(()) => report.deleted += 1,
            Err(err) => {
                tracing::warn!(?id, error = %err, "Failed to delete instance");
                report.failures.push(ApplyFailure {
                    action: ApplyAction::Delete,
                    target: format!("{id:?}"),
                    reason: err.to_string(),
                });
            }
        }
    }

    for occurrence in &plan.to_create {
        match store.create(occurrence) {
            Ok(id) => {
                report.created += 1;
                report.created_ids.push(id);
            }
            Err(err) => {
                tracing::warn!(start = %occurrence.start, error = %err, "Failed to create instance");
                report.failures.push(ApplyFailure {
                    action: ApplyAction::Create,
                    target: occurrence.start.to_rfc3339(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if report.is_complete() {
        tracing::debug!(%report, "Applied reconcile plan");
    } else {
        tracing::warn!(%report, failures = report.failures.len(), "Reconcile plan partially applied");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::reconcile::SeriesState;
    use chrono::{TimeDelta, TimeZone, Utc};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Default)]
    struct FlakyStore {
        instances: BTreeMap<u32, Occurrence>,
        next_id: u32,
        fail_delete: BTreeSet<u32>,
        fail_create_after: Option<usize>,
    }

    impl InstanceStore for FlakyStore {
        type Id = u32;
        type Error = String;

        fn delete(&mut self, id: &u32) -> Result<(), String> {
            if self.fail_delete.contains(id) {
                return Err(format!("instance {id} is locked"));
            }
            self.instances.remove(id).map(|_| ()).ok_or_else(|| "missing".to_string())
        }

        fn create(&mut self, occurrence: &Occurrence) -> Result<u32, String> {
            if self.fail_create_after.is_some_and(|limit| self.instances.len() >= limit) {
                return Err("storage full".to_string());
            }
            self.next_id += 1;
            self.instances.insert(self.next_id, *occurrence);
            Ok(self.next_id)
        }
    }

    fn occurrence(day: u32) -> Occurrence {
        let start = Utc.with_ymd_and_hms(2022, 3, day, 9, 0, 0).unwrap();
        Occurrence::new(start, start + TimeDelta::hours(1))
    }

    fn seeded_store() -> FlakyStore {
        let mut store = FlakyStore::default();
        for day in 1..=4 {
            store.create(&occurrence(day)).unwrap();
        }
        store
    }

    fn plan(to_delete: &[u32], days: &[u32]) -> ReconcilePlan<u32> {
        ReconcilePlan {
            state: SeriesState::Stale,
            to_delete: to_delete.iter().copied().collect(),
            to_create: days.iter().map(|day| occurrence(*day)).collect(),
        }
    }

    #[test]
    fn applies_full_plan() {
        let mut store = seeded_store();
        let report = apply_plan(&plan(&[1, 2, 3, 4], &[10, 11, 12, 13, 14]), &mut store);

        assert!(report.is_complete());
        assert_eq!(
            report.to_string(),
            "deleted 4 of 4 instances, created 5 of 5 instances"
        );
        assert_eq!(report.created_ids, vec![5, 6, 7, 8, 9]);
        assert_eq!(store.instances.len(), 5);
    }

    #[test_log::test]
    fn continues_past_failures() {
        let mut store = seeded_store();
        store.fail_delete.insert(2);
        store.fail_create_after = Some(3);

        let report = apply_plan(&plan(&[1, 2, 3, 4], &[10, 11, 12]), &mut store);

        assert_eq!(
            report.to_string(),
            "deleted 3 of 4 instances, created 2 of 3 instances"
        );
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].action, ApplyAction::Delete);
        assert_eq!(report.failures[0].target, "2");
        assert_eq!(report.failures[1].action, ApplyAction::Create);
        assert_eq!(report.failures[1].reason, "storage full");
    }

    #[test]
    fn empty_plan_touches_nothing() {
        let mut store = seeded_store();
        let report = apply_plan(&ReconcilePlan::unchanged(), &mut store);
        assert_eq!(
            report.to_string(),
            "deleted 0 of 0 instances, created 0 of 0 instances"
        );
        assert_eq!(store.instances.len(), 4);
    }
}
