//! State-convergence waiter
//!
//! Polls a [`StateSource`] until the reported label is one of the target
//! states, with exponential backoff between polls:
//!
//! - an initial `delay` before the first poll
//! - backoff starts at 100ms and doubles, floored at `min_interval` and
//!   capped at `max(min_interval, 10s)`
//! - the whole wait, including in-flight fetches, is bounded by `timeout`
//! - a cancelled token ends the wait promptly with [`WaitError::Cancelled`]

use crate::error::{Result, WaitError};
use crate::source::{EntityRef, Observed, StateSource};
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Delay before the first poll unless overridden
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Minimum spacing between polls unless overridden
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(30);

const INITIAL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_INTERVAL: Duration = Duration::from_secs(10);

/// Stand-in deadline for timeouts too large to add to the clock
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// What to wait for and how patiently
#[derive(Debug, Clone, PartialEq)]
pub struct WaitSpec {
    pub entity: EntityRef,
    /// Labels that mean "still working on it"
    pub pending: Vec<String>,
    /// Labels that end the wait successfully
    pub target: Vec<String>,
    pub delay: Duration,
    pub min_interval: Duration,
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(entity: EntityRef, pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        Self {
            entity,
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            delay: DEFAULT_DELAY,
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target labels joined the way error messages show them
    pub fn expected(&self) -> String {
        self.target.join(", ")
    }

    fn is_target(&self, state: &str) -> bool {
        self.target.iter().any(|t| t == state)
    }

    fn is_pending(&self, state: &str) -> bool {
        self.pending.iter().any(|p| p == state)
    }

    /// Poll `source` until it reports a target state
    ///
    /// Returns the snapshot fetched on the successful poll.
    pub async fn wait<S: StateSource>(
        &self,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<Observed<S::Snapshot>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(entity = %self.entity, "Wait cancelled");
                Err(WaitError::Cancelled { entity: self.entity.clone() })
            }
            result = self.poll(source) => result,
        }
    }

    async fn poll<S: StateSource>(&self, source: &S) -> Result<Observed<S::Snapshot>> {
        let deadline = deadline_after(self.timeout);
        let mut last_state: Option<String> = None;
        let mut interval = INITIAL_INTERVAL;
        let mut polls: u32 = 0;

        debug!(
            entity = %self.entity,
            target = %self.expected(),
            timeout = ?self.timeout,
            "Waiting for state"
        );

        if !sleep_within(deadline, self.delay).await {
            return Err(self.timed_out(last_state));
        }

        loop {
            let observed = match time::timeout_at(deadline, source.fetch()).await {
                Err(_) => return Err(self.timed_out(last_state)),
                Ok(Err(source)) => {
                    return Err(WaitError::FetchFailed {
                        entity: self.entity.clone(),
                        source,
                    });
                }
                Ok(Ok(observed)) => observed,
            };
            polls += 1;
            debug!(entity = %self.entity, state = %observed.state, polls, "Polled state");

            if self.is_target(&observed.state) {
                info!(entity = %self.entity, state = %observed.state, polls, "Reached target state");
                return Ok(observed);
            }
            if !self.is_pending(&observed.state) {
                return Err(WaitError::UnexpectedState {
                    entity: self.entity.clone(),
                    state: observed.state,
                    expected: self.expected(),
                });
            }

            last_state = Some(observed.state);
            interval = next_interval(interval, self.min_interval);
            if !sleep_within(deadline, interval).await {
                return Err(self.timed_out(last_state));
            }
        }
    }

    fn timed_out(&self, last_state: Option<String>) -> WaitError {
        WaitError::Timeout {
            entity: self.entity.clone(),
            expected: self.expected(),
            last_state: last_state.unwrap_or_default(),
            timeout: self.timeout,
        }
    }
}

/// Next backoff step: doubled, floored at `min_interval`, capped at `max(min_interval, 10s)`
fn next_interval(current: Duration, min_interval: Duration) -> Duration {
    let ceiling = MAX_INTERVAL.max(min_interval);
    current.saturating_mul(2).clamp(min_interval, ceiling)
}

/// `timeout` from now, saturating at a far-future instant
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

/// Sleep for `duration`, or until `deadline` if that comes first.
/// Returns false when the deadline cut the sleep short.
async fn sleep_within(deadline: Instant, duration: Duration) -> bool {
    let wake = deadline_after(duration);
    if wake >= deadline {
        time::sleep_until(deadline).await;
        false
    } else {
        time::sleep_until(wake).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clo_api::ApiError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed sequence of fetch results; the last one repeats
    struct Script {
        steps: Mutex<VecDeque<std::result::Result<&'static str, u16>>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(steps: Vec<std::result::Result<&'static str, u16>>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn states(states: &[&'static str]) -> Self {
            Self::new(states.iter().map(|s| Ok(*s)).collect())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StateSource for Script {
        type Snapshot = usize;

        async fn fetch(&self) -> clo_api::Result<Observed<usize>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let mut steps = self.steps.lock().unwrap();
            let step = if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            };
            match step.expect("script is never empty") {
                Ok(state) => Ok(Observed::new(state, call)),
                Err(code) => Err(ApiError::status(code, "scripted failure")),
            }
        }
    }

    fn building_spec(timeout: Duration) -> WaitSpec {
        WaitSpec::new(
            EntityRef::server("srv-1"),
            &["BUILDING"],
            &["ACTIVE"],
            timeout,
        )
    }

    #[test]
    fn test_next_interval_floor_and_cap() {
        let min = Duration::from_secs(30);
        assert_eq!(next_interval(INITIAL_INTERVAL, min), min);
        assert_eq!(next_interval(min, min), min);

        let zero = Duration::ZERO;
        assert_eq!(next_interval(INITIAL_INTERVAL, zero), Duration::from_millis(200));
        assert_eq!(next_interval(Duration::from_secs(8), zero), MAX_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_does_not_overflow() {
        let source = Script::states(&["BUILDING", "ACTIVE"]);
        let spec = building_spec(Duration::from_secs(u64::MAX));

        let observed = spec.wait(&source, &CancellationToken::new()).await.unwrap();
        assert_eq!(observed.state, "ACTIVE");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_then_target_polls_once_per_state() {
        let source = Script::states(&["BUILDING", "BUILDING", "ACTIVE"]);
        let spec = building_spec(Duration::from_secs(30 * 60));

        let observed = spec.wait(&source, &CancellationToken::new()).await.unwrap();
        assert_eq!(observed.state, "ACTIVE");
        assert_eq!(observed.snapshot, 3);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_on_first_poll() {
        let source = Script::states(&["ACTIVE"]);
        let spec = building_spec(Duration::from_secs(60));

        let observed = spec.wait(&source, &CancellationToken::new()).await.unwrap();
        assert_eq!(observed.snapshot, 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_initial_delay_and_min_interval() {
        let source = Script::states(&["BUILDING", "ACTIVE"]);
        let spec = building_spec(Duration::from_secs(600));

        let started = Instant::now();
        spec.wait(&source, &CancellationToken::new()).await.unwrap();
        // 10s delay + one 30s interval
        assert_eq!(started.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_while_pending() {
        let source = Script::states(&["BUILDING"]);
        let spec = building_spec(Duration::from_secs(60));

        let err = spec.wait(&source, &CancellationToken::new()).await.unwrap_err();
        match err {
            WaitError::Timeout {
                expected,
                last_state,
                timeout,
                ..
            } => {
                assert_eq!(expected, "ACTIVE");
                assert_eq!(last_state, "BUILDING");
                assert_eq!(timeout, Duration::from_secs(60));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // polls at 10s, 40s; the next one would land past the deadline
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_shorter_than_delay_never_polls() {
        let source = Script::states(&["ACTIVE"]);
        let spec = building_spec(Duration::from_secs(5));

        let err = spec.wait(&source, &CancellationToken::new()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(source.calls(), 0);
        assert!(err.to_string().contains("last state: ''"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_state_fails_immediately() {
        let source = Script::states(&["ERROR"]);
        let spec = building_spec(Duration::from_secs(600));

        let err = spec.wait(&source, &CancellationToken::new()).await.unwrap_err();
        match err {
            WaitError::UnexpectedState {
                state, expected, ..
            } => {
                assert_eq!(state, "ERROR");
                assert_eq!(expected, "ACTIVE");
            }
            other => panic!("expected unexpected state, got {other:?}"),
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_outside_delete_flow_is_a_fetch_failure() {
        let source = Script::new(vec![Ok("BUILDING"), Err(404)]);
        let spec = building_spec(Duration::from_secs(600));

        let err = spec.wait(&source, &CancellationToken::new()).await.unwrap_err();
        match &err {
            WaitError::FetchFailed { source, .. } => assert!(source.is_not_found()),
            other => panic!("expected fetch failure, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "CLO API error 404 (not found): scripted failure"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_waiting() {
        let source = Script::states(&["BUILDING"]);
        let spec = building_spec(Duration::from_secs(3600));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(45)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = spec.wait(&source, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_token_skips_fetching() {
        let source = Script::states(&["ACTIVE"]);
        let spec = building_spec(Duration::from_secs(60)).with_delay(Duration::ZERO);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = spec.wait(&source, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_again_after_target_returns_immediately() {
        let source = Script::states(&["ACTIVE"]);
        let spec = building_spec(Duration::from_secs(60)).with_delay(Duration::ZERO);
        let cancel = CancellationToken::new();

        let first = spec.wait(&source, &cancel).await.unwrap();
        let started = Instant::now();
        let second = spec.wait(&source, &cancel).await.unwrap();
        assert_eq!(first.state, second.state);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(source.calls(), 2);
    }
}
