//! Per-operation context handed to every handler

use clo_api::ApiClient;
use clo_converge::{DEFAULT_DELAY, DEFAULT_MIN_INTERVAL, EntityRef, RetryConfig, WaitSpec};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How state waits pace their polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait before the first poll
    pub delay: Duration,
    /// Minimum spacing between polls
    pub min_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// API handle, cancellation and poll pacing for one provider instance
#[derive(Debug, Clone)]
pub struct OpContext {
    pub client: Arc<ApiClient>,
    pub cancel: CancellationToken,
    pub poll: PollSettings,
    pub retry: RetryConfig,
}

impl OpContext {
    pub fn new(client: Arc<ApiClient>, poll: PollSettings) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
            poll,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    /// Wait specification paced by this context's poll settings
    pub fn wait_spec(
        &self,
        entity: EntityRef,
        pending: &[&str],
        target: &[&str],
        timeout: Duration,
    ) -> WaitSpec {
        WaitSpec::new(entity, pending, target, timeout)
            .with_delay(self.poll.delay)
            .with_min_interval(self.poll.min_interval)
    }
}
