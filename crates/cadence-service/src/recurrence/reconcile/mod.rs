//! Instance reconciliation: deciding which generated instances to delete and
//! which occurrences to create after a series changes.
//!
//! Deciding is pure; [`apply_plan`] performs the decision against an
//! [`InstanceStore`] the caller provides.

mod apply;
mod strategy;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::recurrence::model::Occurrence;

pub use apply::{ApplyAction, ApplyFailure, ApplyReport, InstanceStore, apply_plan};
pub use strategy::{
    NoOp, ReconcileStrategy, RecreateAll, SeriesChange, SeriesState, strategy_for,
};

/// The computed transition for one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan<Id: Ord> {
    pub state: SeriesState,
    pub to_delete: BTreeSet<Id>,
    pub to_create: Vec<Occurrence>,
}

impl<Id: Ord> ReconcilePlan<Id> {
    #[must_use]
    pub fn unchanged() -> Self {
        Self {
            state: SeriesState::Unchanged,
            to_delete: BTreeSet::new(),
            to_create: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty()
    }
}

/// ## Summary
/// Decides the transition from the series' existing instances to `next`.
///
/// A stale series deletes every previous instance and creates every
/// occurrence in `next`; an unchanged one does nothing.
#[must_use]
pub fn reconcile<Id, I>(
    previous_ids: I,
    next: &[Occurrence],
    change: SeriesChange<'_>,
    strategy: &dyn ReconcileStrategy,
) -> ReconcilePlan<Id>
where
    Id: Ord,
    I: IntoIterator<Item = Id>,
{
    reconcile_with(previous_ids, next, change, strategy, Some)
}

/// ## Summary
/// Like [`reconcile`], passing each occurrence to create through `hook`.
///
/// The hook may rewrite an occurrence or drop it by returning `None`; the
/// create list is kept in ascending order.
#[tracing::instrument(skip_all, fields(strategy = strategy.name(), next = next.len()))]
pub fn reconcile_with<Id, I, F>(
    previous_ids: I,
    next: &[Occurrence],
    change: SeriesChange<'_>,
    strategy: &dyn ReconcileStrategy,
    hook: F,
) -> ReconcilePlan<Id>
where
    Id: Ord,
    I: IntoIterator<Item = Id>,
    F: FnMut(Occurrence) -> Option<Occurrence>,
{
    match strategy.state(change) {
        SeriesState::Unchanged => {
            tracing::debug!("Series unchanged, keeping instances");
            ReconcilePlan::unchanged()
        }
        SeriesState::Stale => {
            let to_delete: BTreeSet<Id> = previous_ids.into_iter().collect();
            let mut to_create: Vec<Occurrence> = next.iter().copied().filter_map(hook).collect();
            to_create.sort();

            tracing::debug!(
                delete = to_delete.len(),
                create = to_create.len(),
                "Series stale, recreating instances"
            );
            ReconcilePlan {
                state: SeriesState::Stale,
                to_delete,
                to_create,
            }
        }
    }
}
