//! CLO API error types

use thiserror::Error;

/// HTTP status the API uses for a missing entity
pub const NOT_FOUND_CODE: u16 = 404;

/// Coarse classification of a non-success API response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The entity does not exist (or no longer exists)
    NotFound,
    /// Token missing, expired or lacking permissions
    Unauthorized,
    /// The entity is busy or the request conflicts with its state
    Conflict,
    /// Too many requests
    RateLimited,
    /// Any other 4xx response
    Client,
    /// 5xx response
    Server,
}

impl ErrorKind {
    pub fn from_status(code: u16) -> Self {
        match code {
            NOT_FOUND_CODE => ErrorKind::NotFound,
            401 | 403 => ErrorKind::Unauthorized,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::RateLimited => write!(f, "rate limited"),
            ErrorKind::Client => write!(f, "client error"),
            ErrorKind::Server => write!(f, "server error"),
        }
    }
}

/// CLO API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("CLO API error {code} ({kind}): {message}")]
    Status {
        kind: ErrorKind,
        code: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            kind: ErrorKind::from_status(code),
            code,
            message: message.into(),
        }
    }

    /// The kind of a status error, `None` for transport and decoding failures
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True only for a `NotFound` status carrying the not-found code
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                kind: ErrorKind::NotFound,
                code: NOT_FOUND_CODE,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
