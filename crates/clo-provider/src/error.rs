//! Provider error types

use clo_api::ApiError;
use clo_converge::WaitError;
use std::time::Duration;
use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Invalid attribute {name}: {reason}")]
    InvalidAttribute { name: String, reason: String },

    #[error("{0}")]
    InvalidConfig(String),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("State file error: {0}")]
    State(String),

    #[error("Lock acquisition failed: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ProviderError::InvalidAttribute {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// True when the underlying API reported the entity as missing
    pub fn is_not_found(&self) -> bool {
        match self {
            ProviderError::Api(e) => e.is_not_found(),
            ProviderError::Wait(WaitError::FetchFailed { source, .. }) => source.is_not_found(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
