//! Convergence error types

use crate::source::EntityRef;
use clo_api::ApiError;
use std::time::Duration;
use thiserror::Error;

/// Why a wait ended without reaching a target state
#[derive(Error, Debug)]
pub enum WaitError {
    /// The fetch failed with anything other than a reclassified not-found.
    /// Displays the API error unmodified.
    #[error("{source}")]
    FetchFailed { entity: EntityRef, source: ApiError },

    #[error("unexpected state '{state}' for {entity}, wanted target '{expected}'")]
    UnexpectedState {
        entity: EntityRef,
        state: String,
        expected: String,
    },

    #[error(
        "timeout while waiting for {entity} to become '{expected}' (last state: '{last_state}', timeout: {timeout:?})"
    )]
    Timeout {
        entity: EntityRef,
        expected: String,
        last_state: String,
        timeout: Duration,
    },

    #[error("wait for {entity} cancelled")]
    Cancelled { entity: EntityRef },
}

impl WaitError {
    pub fn entity(&self) -> &EntityRef {
        match self {
            WaitError::FetchFailed { entity, .. }
            | WaitError::UnexpectedState { entity, .. }
            | WaitError::Timeout { entity, .. }
            | WaitError::Cancelled { entity } => entity,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, WaitError>;
