use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub recurrence: RecurrenceConfig,
}

/// Which reconciliation strategy decides what happens to existing instances
/// when a series changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RecreateAll,
    NoOp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub default_timezone: String,
    pub strategy: StrategyKind,
    pub threshold: ThresholdConfig,
    pub max_occurrences: usize,
}

/// Instance-count threshold applied before a series is saved.
#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    pub warn: bool,
    pub count: usize,
    pub prevent_save: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional `cadence.toml` and
    /// `CADENCE__`-prefixed environment variables, in increasing precedence.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it
    /// fails, or the loaded values do not validate.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name("cadence.toml").required(false))
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        settings.recurrence.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Returns a builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be set.
    pub fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "debug")?
            .set_default("recurrence.default_timezone", "UTC")?
            .set_default("recurrence.strategy", "recreate_all")?
            .set_default("recurrence.threshold.warn", true)?
            .set_default("recurrence.threshold.count", 200)?
            .set_default("recurrence.threshold.prevent_save", false)?
            .set_default("recurrence.max_occurrences", 5000)?)
    }
}

impl RecurrenceConfig {
    /// ## Summary
    /// Checks the limits that deserialization alone cannot.
    ///
    /// ## Errors
    /// Returns [`CoreError::ValidationError`] naming the first invalid key.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_occurrences == 0 {
            return Err(CoreError::ValidationError {
                field: "recurrence.max_occurrences",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.threshold.prevent_save && self.threshold.count == 0 {
            return Err(CoreError::ValidationError {
                field: "recurrence.threshold.count",
                reason: "must be at least 1 when prevent_save is set".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
            recurrence: RecurrenceConfig {
                default_timezone: "UTC".to_string(),
                strategy: StrategyKind::RecreateAll,
                threshold: ThresholdConfig {
                    warn: true,
                    count: 200,
                    prevent_save: false,
                },
                max_occurrences: 5000,
            },
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    Settings::load()
}
