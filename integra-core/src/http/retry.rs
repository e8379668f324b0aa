use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use super::error::HttpError;

/// How often and how patiently a provider call is repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    pub fn single_attempt() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_attempts(attempts: usize) -> Self {
        Self {
            attempts,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, doubling up to `max_delay`
    fn delay_after(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1) as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("Gave up after {attempts} attempt(s): {error}")]
    Exhausted { error: HttpError, attempts: usize },
    #[error("{0}")]
    Fatal(HttpError),
}

impl RetryError {
    pub fn last_error(&self) -> &HttpError {
        match self {
            Self::Exhausted { error, .. } | Self::Fatal(error) => error,
        }
    }

    pub fn into_last_error(self) -> HttpError {
        match self {
            Self::Exhausted { error, .. } | Self::Fatal(error) => error,
        }
    }

    pub fn is_rejection(&self) -> bool {
        self.last_error().is_rejection()
    }
}

/// Run `call` until it succeeds, fails with a non-retriable error or the
/// policy's attempts are used up.
pub async fn with_backoff<F, Fut, T>(policy: &RetryPolicy, call: F) -> Result<T, RetryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match call().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if !error.is_retriable() {
            return Err(RetryError::Fatal(error));
        }
        if attempt >= attempts {
            return Err(RetryError::Exhausted { error, attempts });
        }

        let delay = policy.delay_after(attempt);
        warn!(
            "Identity provider call failed (attempt {}/{}), retrying in {:?}: {}",
            attempt, attempts, delay, error
        );
        sleep(delay).await;
        attempt += 1;
    }
}
