use std::path::{Path, PathBuf};

use cadence_core::config::Settings;
use cadence_service::recurrence::diff::ConfigSnapshot;
use cadence_service::recurrence::{
    Expander, SeriesChange, check_threshold, default_timezone, diff_series, export_rrule,
    import_rrule, resolve_timezone, series_from_json, strategy_for,
};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::error::{AppError, AppResult};

/// Accepted layouts for local date-times on the command line.
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Expand, compare and exchange recurring series documents.
#[derive(Debug, Parser)]
#[clap(name = "cadence", version, about = "Recurring event series expansion")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the occurrences of a series document and its threshold outcome
    Expand {
        /// Path to the series document (JSON)
        series: PathBuf,
    },
    /// Print the fields that differ between two series documents
    Diff { previous: PathBuf, next: PathBuf },
    /// Convert an RRULE into a series document
    Import {
        /// RRULE text, optionally with EXDATE lines
        #[clap(long)]
        rrule: String,
        /// Local start of the first occurrence, e.g. 2026-01-05T09:00:00
        #[clap(long)]
        start: String,
        /// Local end of the first occurrence
        #[clap(long)]
        end: Option<String>,
        /// Timezone of the series; defaults to `recurrence.default_timezone`
        #[clap(long)]
        tz: Option<String>,
    },
    /// Print the RRULE lines of a series document
    Export { series: PathBuf },
}

/// ## Summary
/// Runs one command and returns what should be written to stdout.
///
/// ## Errors
/// Returns an error if an input file cannot be read or parsed, or the
/// command itself fails.
#[tracing::instrument(skip_all)]
pub fn run(cli: Cli, settings: &Settings) -> AppResult<String> {
    match cli.command {
        Commands::Expand { series } => expand(&read(&series)?, settings),
        Commands::Diff { previous, next } => diff(&read(&previous)?, &read(&next)?, settings),
        Commands::Import {
            rrule,
            start,
            end,
            tz,
        } => import(&rrule, &start, end.as_deref(), tz.as_deref(), settings),
        Commands::Export { series } => export(&read(&series)?),
    }
}

fn read(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// ## Summary
/// Expands a series document under the configured cap and threshold.
///
/// ## Errors
/// Returns an error if the document is malformed.
pub fn expand(document: &str, settings: &Settings) -> AppResult<String> {
    let series = series_from_json(document)?;
    let expansion = Expander::from_config(&settings.recurrence).expand(&series);
    let threshold = check_threshold(expansion.occurrences.len(), &settings.recurrence.threshold);

    tracing::info!(
        kind = %series.rule.kind(),
        count = expansion.occurrences.len(),
        truncated = expansion.truncated,
        "Expanded series"
    );

    Ok(serde_json::to_string_pretty(&json!({
        "kind": series.rule.kind(),
        "occurrences": expansion.occurrences,
        "truncated": expansion.truncated,
        "threshold": threshold,
    }))?)
}

/// ## Summary
/// Diffs two series documents and reports what the configured strategy
/// would do with the existing instances.
///
/// ## Errors
/// Returns an error if either document is malformed.
pub fn diff(previous: &str, next: &str, settings: &Settings) -> AppResult<String> {
    let previous = series_from_json(previous)?;
    let next = series_from_json(next)?;

    let changes = diff_series(&previous, &next);
    let strategy = strategy_for(settings.recurrence.strategy);
    let state = strategy.state(SeriesChange::Updated(&changes));

    tracing::info!(changed = changes.len(), strategy = strategy.name(), "Compared series");

    Ok(serde_json::to_string_pretty(&json!({
        "changed": !changes.is_empty(),
        "strategy": strategy.name(),
        "state": state,
        "entries": changes,
        "fingerprints": {
            "previous": ConfigSnapshot::from_series(&previous).fingerprint(),
            "next": ConfigSnapshot::from_series(&next).fingerprint(),
        },
    }))?)
}

/// ## Summary
/// Imports an RRULE into a series document.
///
/// ## Errors
/// Returns an error if a date-time or the timezone is invalid, or the rule
/// cannot be imported.
pub fn import(
    rrule: &str,
    start: &str,
    end: Option<&str>,
    tz: Option<&str>,
    settings: &Settings,
) -> AppResult<String> {
    let first_start = parse_local("start", start)?;
    let first_end = end.map(|end| parse_local("end", end)).transpose()?;
    let tz = match tz {
        Some(tzid) => resolve_timezone(tzid)?,
        None => default_timezone(&settings.recurrence)?,
    };

    let series = import_rrule(rrule, first_start, first_end, tz)?;
    tracing::info!(kind = %series.rule.kind(), %tz, "Imported RRULE");
    Ok(serde_json::to_string_pretty(&series)?)
}

/// ## Summary
/// Renders a series document as RRULE lines.
///
/// ## Errors
/// Returns an error if the document is malformed or its rule has no RRULE
/// form.
pub fn export(document: &str) -> AppResult<String> {
    let series = series_from_json(document)?;
    export_rrule(&series.rule, &series.excluded_dates).ok_or_else(|| AppError::InvalidArgument {
        name: "series",
        reason: format!("{} rules have no RRULE form", series.rule.kind()),
    })
}

fn parse_local(name: &'static str, value: &str) -> AppResult<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| AppError::InvalidArgument {
            name,
            reason: format!("`{value}` is not a local date-time (YYYY-MM-DDTHH:MM[:SS])"),
        })
}
