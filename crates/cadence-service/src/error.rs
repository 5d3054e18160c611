use thiserror::Error;

use crate::recurrence::import::ImportError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Malformed series document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
