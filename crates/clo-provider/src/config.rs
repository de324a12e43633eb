//! Provider configuration
//!
//! Credentials come from the caller or from the environment:
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `CLO_API_AUTH_URL` | API base URL | required |
//! | `CLO_API_AUTH_TOKEN` | bearer token issued in the user area | required |
//! | `CLO_POLL_DELAY` | wait before the first state poll | `10s` |
//! | `CLO_POLL_INTERVAL` | minimum spacing between polls | `30s` |
//! | `CLO_REQUEST_TIMEOUT` | per-request HTTP timeout | `60s` |

use crate::context::PollSettings;
use crate::error::{ProviderError, Result};
use clo_api::ClientConfig;
use std::time::Duration;

pub const AUTH_URL_ENV: &str = "CLO_API_AUTH_URL";
pub const AUTH_TOKEN_ENV: &str = "CLO_API_AUTH_TOKEN";
pub const POLL_DELAY_ENV: &str = "CLO_POLL_DELAY";
pub const POLL_INTERVAL_ENV: &str = "CLO_POLL_INTERVAL";
pub const REQUEST_TIMEOUT_ENV: &str = "CLO_REQUEST_TIMEOUT";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ProviderConfig {
    /// URI of the CLO API
    pub auth_url: String,

    /// Bearer token
    pub token: String,

    /// Poll tuning for state waits
    pub poll: PollSettings,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("auth_url", &self.auth_url)
            .field("token", &"<redacted>")
            .field("poll", &self.poll)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(auth_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token: token.into(),
            poll: PollSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read everything from the environment and validate it
    pub fn from_env() -> Result<Self> {
        let auth_url = std::env::var(AUTH_URL_ENV).unwrap_or_default();
        let token = std::env::var(AUTH_TOKEN_ENV).unwrap_or_default();
        let config = Self::new(auth_url, token).with_env_tuning()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay poll and request tuning from the environment
    pub fn with_env_tuning(mut self) -> Result<Self> {
        self.poll.delay = duration_from_env(POLL_DELAY_ENV, self.poll.delay)?;
        self.poll.min_interval = duration_from_env(POLL_INTERVAL_ENV, self.poll.min_interval)?;
        self.request_timeout = duration_from_env(REQUEST_TIMEOUT_ENV, self.request_timeout)?;
        Ok(self)
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth_url.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(format!(
                "{} parameter should be provided",
                AUTH_URL_ENV
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ProviderError::InvalidConfig(format!(
                "{} parameter should be provided",
                AUTH_TOKEN_ENV
            )));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.auth_url, &self.token).with_request_timeout(self.request_timeout)
    }
}

fn duration_from_env(name: &str, default: Duration) -> Result<Duration> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => humantime::parse_duration(value.trim())
            .map_err(|e| ProviderError::InvalidConfig(format!("{}: {}", name, e))),
        _ => Ok(default),
    }
}
