//! The recurrence engine: rule model, occurrence generation, configuration
//! diffing, instance reconciliation and RRULE exchange.

pub mod diff;
pub mod export;
pub mod generate;
pub mod import;
pub mod model;
pub mod reconcile;
pub mod threshold;

use cadence_core::config::RecurrenceConfig;
use cadence_core::error::CoreError;
use chrono_tz::Tz;

use crate::error::{ServiceError, ServiceResult};

pub use diff::{ConfigDiff, ConfigSnapshot, DiffEntry, diff, diff_series};
pub use export::export_rrule;
pub use generate::{
    Expander, Expansion, generate, generate_first, generate_with, included_occurrences,
};
pub use import::{ImportError, import_rrule, resolve_timezone};
pub use model::{Occurrence, RecurrencePattern, RecurrenceRule, SeriesDocument};
pub use reconcile::{
    ReconcilePlan, ReconcileStrategy, SeriesChange, SeriesState, apply_plan, reconcile,
    reconcile_with, strategy_for,
};
pub use threshold::{ThresholdOutcome, check_threshold};

/// ## Summary
/// Parses a series document from its JSON form.
///
/// ## Errors
/// Returns [`ServiceError::Json`] if the document is malformed or names an
/// unknown timezone or recurrence type.
pub fn series_from_json(json: &str) -> ServiceResult<SeriesDocument> {
    let series: SeriesDocument = serde_json::from_str(json)?;
    tracing::debug!(kind = %series.rule.kind(), tz = %series.rule.timezone, "Loaded series document");
    Ok(series)
}

/// ## Summary
/// Resolves the configured fallback timezone.
///
/// ## Errors
/// Returns [`CoreError::ConfigError`] if the name does not resolve to an
/// IANA timezone.
pub fn default_timezone(config: &RecurrenceConfig) -> ServiceResult<Tz> {
    resolve_timezone(&config.default_timezone).map_err(|err| {
        ServiceError::CoreError(CoreError::ConfigError(format!(
            "recurrence.default_timezone: {err}"
        )))
    })
}
