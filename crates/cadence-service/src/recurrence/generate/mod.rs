//! Occurrence generation for recurrence rules.

pub mod dates;
mod expand;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use cadence_core::config::RecurrenceConfig;
use chrono::NaiveDate;
use serde::Serialize;

use crate::recurrence::model::{
    EventLength, Occurrence, RecurrencePattern, RecurrenceRule, SeriesDocument,
};

pub use dates::{
    days_between, last_day_of_month, month_day, months_between, nth_weekday_of_month,
    years_between,
};

/// ## Summary
/// Generates the occurrences of `rule`, dropping those whose local calendar
/// date is in `excluded`.
///
/// Output is ascending and free of duplicates. Inverted ranges and rules
/// missing required parameters produce an empty sequence.
#[must_use]
pub fn generate(rule: &RecurrenceRule, excluded: &[NaiveDate]) -> Vec<Occurrence> {
    generate_with(rule, excluded, Some)
}

/// ## Summary
/// Like [`generate`], passing every surviving occurrence through `hook`.
///
/// The hook may rewrite an occurrence or drop it by returning `None`. The
/// result is re-sorted and deduplicated afterwards.
///
/// Exclusions do not apply to custom rules; their dates are literal.
#[tracing::instrument(skip_all, fields(kind = %rule.kind(), tz = %rule.timezone))]
pub fn generate_with<F>(rule: &RecurrenceRule, excluded: &[NaiveDate], mut hook: F) -> Vec<Occurrence>
where
    F: FnMut(Occurrence) -> Option<Occurrence>,
{
    let mut occurrences: Vec<Occurrence> = surviving(rule, excluded, usize::MAX)
        .into_iter()
        .filter_map(&mut hook)
        .collect();

    occurrences.sort();
    occurrences.dedup();
    log_generated(&occurrences);
    occurrences
}

/// ## Summary
/// The first `limit` occurrences [`generate`] would return.
///
/// Generation stops at `limit`, so the rest of a long range is never
/// materialized.
#[must_use]
#[tracing::instrument(skip_all, fields(kind = %rule.kind(), tz = %rule.timezone, limit = limit))]
pub fn generate_first(rule: &RecurrenceRule, excluded: &[NaiveDate], limit: usize) -> Vec<Occurrence> {
    let occurrences = surviving(rule, excluded, limit);
    log_generated(&occurrences);
    occurrences
}

/// Expanded occurrences whose local date is not excluded, up to `limit`.
fn surviving(rule: &RecurrenceRule, excluded: &[NaiveDate], limit: usize) -> Vec<Occurrence> {
    let excluded: BTreeSet<NaiveDate> = excluded.iter().copied().collect();
    let filter_excluded = !matches!(rule.pattern, RecurrencePattern::Custom { .. });

    expand::expand(rule, limit, |occurrence| {
        let keep = !filter_excluded || !excluded.contains(&occurrence.local_date(rule.timezone));
        if !keep {
            tracing::trace!(start = %occurrence.start, "Excluded by date");
        }
        keep
    })
}

fn log_generated(occurrences: &[Occurrence]) {
    if occurrences.is_empty() {
        tracing::warn!("Rule produced no occurrences");
    } else {
        tracing::debug!(count = occurrences.len(), "Generated occurrences");
    }
}

/// ## Summary
/// One occurrence per included date, at the rule's start time and length.
///
/// Custom rules take both from their first listed occurrence; a custom rule
/// with no occurrences yields nothing. Consecutive rules use one slot.
#[must_use]
pub fn included_occurrences(rule: &RecurrenceRule, dates: &[NaiveDate]) -> Vec<Occurrence> {
    let template = match &rule.pattern {
        RecurrencePattern::Custom { dates } => dates.iter().min().map(|first| {
            let local = cadence_rfc::rfc::ical::to_local(rule.timezone, first.start);
            let seconds = u32::try_from(first.duration().num_seconds().max(0)).unwrap_or(u32::MAX);
            (local.time(), EventLength::Duration(seconds))
        }),
        RecurrencePattern::Consecutive { time, duration, .. } => {
            let seconds = u32::try_from(duration.as_delta().num_seconds()).unwrap_or(u32::MAX);
            Some((*time, EventLength::Duration(seconds)))
        }
        pattern => pattern.time().zip(pattern.length()),
    };

    let Some((time, length)) = template else {
        return Vec::new();
    };

    let mut occurrences: Vec<Occurrence> = dates
        .iter()
        .filter_map(|date| expand::materialize(rule.timezone, *date, time, length))
        .collect();
    occurrences.sort();
    occurrences.dedup();
    occurrences
}

/// Result of expanding a whole series document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub occurrences: Vec<Occurrence>,
    /// `true` when the occurrence cap cut the sequence short.
    pub truncated: bool,
}

/// Expands series documents under the configured occurrence cap.
#[derive(Debug, Clone, Copy)]
pub struct Expander {
    max_occurrences: usize,
}

impl Expander {
    #[must_use]
    pub const fn new(max_occurrences: usize) -> Self {
        Self { max_occurrences }
    }

    #[must_use]
    pub const fn from_config(config: &RecurrenceConfig) -> Self {
        Self::new(config.max_occurrences)
    }

    /// ## Summary
    /// Generated occurrences plus included dates, merged in order and capped.
    ///
    /// Only one occurrence past the cap is generated, enough to tell that the
    /// sequence was cut short.
    #[must_use]
    pub fn expand(&self, series: &SeriesDocument) -> Expansion {
        let mut occurrences = generate_first(
            &series.rule,
            &series.excluded_dates,
            self.max_occurrences.saturating_add(1),
        );
        occurrences.extend(included_occurrences(&series.rule, &series.included_dates));
        occurrences.sort();
        occurrences.dedup();

        let truncated = occurrences.len() > self.max_occurrences;
        if truncated {
            tracing::warn!(
                cap = self.max_occurrences,
                "Truncating expansion at occurrence cap"
            );
            occurrences.truncate(self.max_occurrences);
        }

        Expansion {
            occurrences,
            truncated,
        }
    }
}
