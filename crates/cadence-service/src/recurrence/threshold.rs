//! Instance-count threshold check run before a series is saved.

use cadence_core::config::ThresholdConfig;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ThresholdOutcome {
    WithinLimit,
    /// Over the limit; the caller should ask for confirmation.
    Warn { count: usize, limit: usize },
    /// Over the limit and saving is disabled.
    Block { count: usize, limit: usize },
}

impl ThresholdOutcome {
    #[must_use]
    pub const fn blocks_save(self) -> bool {
        matches!(self, Self::Block { .. })
    }
}

/// ## Summary
/// Compares an occurrence count against the configured threshold.
///
/// `prevent_save` takes precedence over `warn`; with both off every count is
/// within limit.
#[must_use]
pub fn check_threshold(count: usize, config: &ThresholdConfig) -> ThresholdOutcome {
    let limit = config.count;
    if count <= limit {
        return ThresholdOutcome::WithinLimit;
    }

    if config.prevent_save {
        tracing::warn!(count, limit, "Occurrence count over threshold, blocking save");
        ThresholdOutcome::Block { count, limit }
    } else if config.warn {
        tracing::debug!(count, limit, "Occurrence count over threshold");
        ThresholdOutcome::Warn { count, limit }
    } else {
        ThresholdOutcome::WithinLimit
    }
}
