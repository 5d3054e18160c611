//! Strategies deciding whether a series' instances are stale.

use std::fmt;

use cadence_core::config::StrategyKind;
use serde::Serialize;

use crate::recurrence::diff::ConfigDiff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesState {
    /// Existing instances stay as they are.
    Unchanged,
    /// Existing instances are discarded and regenerated.
    Stale,
}

/// What happened to the series since its instances were last generated.
#[derive(Debug, Clone, Copy)]
pub enum SeriesChange<'a> {
    Created,
    Updated(&'a ConfigDiff),
}

pub trait ReconcileStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn state(&self, change: SeriesChange<'_>) -> SeriesState;
}

/// Regenerates on creation and on any configuration difference.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecreateAll;

impl ReconcileStrategy for RecreateAll {
    fn name(&self) -> &'static str {
        "recreate_all"
    }

    fn state(&self, change: SeriesChange<'_>) -> SeriesState {
        match change {
            SeriesChange::Updated(diff) if diff.is_empty() => SeriesState::Unchanged,
            SeriesChange::Created | SeriesChange::Updated(_) => SeriesState::Stale,
        }
    }
}

/// Never regenerates, preserving hand-edited instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOp;

impl ReconcileStrategy for NoOp {
    fn name(&self) -> &'static str {
        "no_op"
    }

    fn state(&self, _change: SeriesChange<'_>) -> SeriesState {
        SeriesState::Unchanged
    }
}

/// Builds the strategy a configuration value names.
#[must_use]
pub fn strategy_for(kind: StrategyKind) -> Box<dyn ReconcileStrategy> {
    match kind {
        StrategyKind::RecreateAll => Box::new(RecreateAll),
        StrategyKind::NoOp => Box::new(NoOp),
    }
}
