use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {field}: {reason}")]
    ValidationError { field: &'static str, reason: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
