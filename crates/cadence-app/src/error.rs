use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors (CLI layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] cadence_service::error::ServiceError),

    #[error(transparent)]
    ImportError(#[from] cadence_service::recurrence::ImportError),

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Failed to render output: {0}")]
    OutputError(#[from] serde_json::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
