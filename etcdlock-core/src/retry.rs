//! Bounded retry with linearly growing delay.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;

/// Retry budget used around a whole lock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first try
    pub max_retries: u32,
    /// Delay unit; retry `n` waits `n * backoff_step`
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(500);

    pub const fn new(max_retries: u32, backoff_step: Duration) -> Self {
        Self {
            max_retries,
            backoff_step,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_step.saturating_mul(retry)
    }

    /// Total number of tries, first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run `operation` under this policy, retrying only errors accepted by
    /// `is_retryable`.
    pub async fn retry<T, E, F, Fut, P>(&self, is_retryable: P, operation: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        with_retry(self.max_retries, |n| self.backoff(n), is_retryable, operation).await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_BACKOFF_STEP)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_step_ms),
        )
    }
}

/// Whole milliseconds in `delay`, clamped to `u64::MAX`.
pub(crate) fn saturating_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Execute `operation`; while it fails with a retryable error and fewer than
/// `max_retries` retries have been spent, sleep `backoff(n)` and try again.
/// Non-retryable errors and the error after the last retry are returned as-is.
pub async fn with_retry<T, E, F, Fut, B, P>(
    max_retries: u32,
    backoff: B,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    B: Fn(u32) -> Duration,
    P: Fn(&E) -> bool,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_retryable(&err) => {
                retries += 1;
                let delay = backoff(retries);
                tracing::warn!(
                    retry = retries,
                    max_retries,
                    delay_ms = saturating_millis(delay),
                    error = %err,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
