//! Retry around a whole wait under one shared time budget
//!
//! Some flows (server creation, volume attach) tolerate transient failures:
//! the wait is retried until the budget runs out, and then the last error is
//! surfaced. Each attempt is handed the budget that remains.

use crate::error::{Result, WaitError};
use crate::source::{Observed, StateSource};
use crate::waiter::{WaitSpec, deadline_after};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Backoff between retried attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay after the given (zero-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max_delay.as_secs_f64()))
    }
}

/// Run `attempt` until it succeeds, is cancelled, or `budget` is spent
///
/// `attempt` receives the remaining budget. Every error except
/// [`WaitError::Cancelled`] is retried; once the budget cannot cover another
/// backoff step the last error is returned.
pub async fn retry_within<T, F, Fut>(
    spec: &WaitSpec,
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let deadline = deadline_after(spec.timeout);
    let mut attempts: u32 = 0;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let error = match attempt(remaining).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => e,
        };

        let pause = config.delay_for_attempt(attempts);
        attempts += 1;
        if deadline_after(pause) >= deadline {
            warn!(entity = %spec.entity, attempts, error = %error, "Retry budget exhausted");
            return Err(with_full_timeout(error, spec.timeout));
        }

        warn!(entity = %spec.entity, attempt = attempts, error = %error, "Retrying after {:?}", pause);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(WaitError::Cancelled { entity: spec.entity.clone() });
            }
            _ = time::sleep(pause) => {}
        }
    }
}

/// Report the whole budget rather than the slice the last attempt got
fn with_full_timeout(error: WaitError, budget: Duration) -> WaitError {
    match error {
        WaitError::Timeout {
            entity,
            expected,
            last_state,
            ..
        } => WaitError::Timeout {
            entity,
            expected,
            last_state,
            timeout: budget,
        },
        other => other,
    }
}

impl WaitSpec {
    /// [`WaitSpec::wait`] retried on failure within this spec's timeout
    pub async fn wait_retrying<S: StateSource>(
        &self,
        source: &S,
        config: &RetryConfig,
        cancel: &CancellationToken,
    ) -> Result<Observed<S::Snapshot>> {
        retry_within(self, config, cancel, |remaining| {
            let spec = self.clone().with_timeout(remaining);
            async move { spec.wait(source, cancel).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EntityRef;
    use async_trait::async_trait;
    use clo_api::ApiError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn spec(timeout: Duration) -> WaitSpec {
        WaitSpec::new(
            EntityRef::server("srv-1"),
            &["BUILDING"],
            &["ACTIVE"],
            timeout,
        )
        .with_delay(Duration::ZERO)
        .with_min_interval(Duration::from_secs(1))
    }

    fn fetch_failed() -> WaitError {
        WaitError::FetchFailed {
            entity: EntityRef::server("srv-1"),
            source: ApiError::status(502, "bad gateway"),
        }
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(10)); // capped at max
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_within(
            &spec(Duration::from_secs(60)),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err(fetch_failed()) } else { Ok(n) } }
            },
        )
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_get_shrinking_budget() {
        let budgets = Mutex::new(Vec::new());
        let _ = retry_within(
            &spec(Duration::from_secs(3)),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |remaining| {
                budgets.lock().unwrap().push(remaining);
                async { Err::<(), _>(fetch_failed()) }
            },
        )
        .await;

        let budgets = budgets.into_inner().unwrap();
        assert_eq!(
            budgets,
            vec![
                Duration::from_secs(3),
                Duration::from_millis(2500),
                Duration::from_millis(1500),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_surfaces_last_error_when_budget_spent() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();
        let err = retry_within(
            &spec(Duration::from_secs(5)),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err::<(), _>(WaitError::UnexpectedState {
                        entity: EntityRef::server("srv-1"),
                        state: format!("ERROR{}", n),
                        expected: "ACTIVE".to_string(),
                    })
                }
            },
        )
        .await
        .unwrap_err();

        // pauses of 0.5s, 1s, 2s fit; the next 4s pause would overrun
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(err.to_string().contains("ERROR3"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_attempt_is_not_retried() {
        let calls = AtomicU32::new(0);
        let err = retry_within(
            &spec(Duration::from_secs(60)),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err::<(), _>(WaitError::Cancelled {
                        entity: EntityRef::server("srv-1"),
                    })
                }
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = retry_within(
            &spec(Duration::from_secs(60)),
            &RetryConfig::default(),
            &cancel,
            |_| async { Err::<(), _>(fetch_failed()) },
        )
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_full_budget() {
        let err = retry_within(
            &spec(Duration::from_secs(5)),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |remaining| async move {
                Err::<(), _>(WaitError::Timeout {
                    entity: EntityRef::server("srv-1"),
                    expected: "ACTIVE".to_string(),
                    last_state: "BUILDING".to_string(),
                    timeout: remaining,
                })
            },
        )
        .await
        .unwrap_err();

        match err {
            WaitError::Timeout { timeout, .. } => assert_eq!(timeout, Duration::from_secs(5)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_budget_does_not_overflow() {
        let calls = AtomicU32::new(0);
        let result = retry_within(
            &spec(Duration::MAX),
            &RetryConfig::default(),
            &CancellationToken::new(),
            |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 1 { Err(fetch_failed()) } else { Ok(n) } }
            },
        )
        .await
        .unwrap();

        assert_eq!(result, 1);
    }

    struct Flaky {
        calls: AtomicU32,
    }

    #[async_trait]
    impl StateSource for Flaky {
        type Snapshot = ();

        async fn fetch(&self) -> clo_api::Result<Observed<()>> {
            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Err(ApiError::status(500, "transient")),
                1 => Ok(Observed::new("BUILDING", ())),
                _ => Ok(Observed::new("ACTIVE", ())),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_retrying_recovers_from_fetch_failure() {
        let source = Flaky {
            calls: AtomicU32::new(0),
        };
        let observed = spec(Duration::from_secs(60))
            .wait_retrying(&source, &RetryConfig::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(observed.state, "ACTIVE");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }
}
