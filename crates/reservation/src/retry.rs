//! Bounded retry with a pluggable backoff strategy.

use std::future::Future;
use std::time::Duration;

/// Delay strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Wait a fixed duration between attempts.
    Fixed(Duration),
}

impl Backoff {
    fn delay(&self) -> Option<Duration> {
        match self {
            Backoff::None => None,
            Backoff::Fixed(duration) => Some(*duration),
        }
    }
}

/// Bounded retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt bound and no backoff.
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::None,
        }
    }

    /// Sets the backoff strategy.
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for RetryPolicy {
    /// The settlement default: up to 3 attempts, immediate retry.
    fn default() -> Self {
        Self::new(3)
    }
}

/// Terminal failure of a retry loop: every attempt failed.
#[derive(Debug)]
pub struct RetriesExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `operation` until it succeeds or the policy's attempt bound is
/// reached, returning the typed terminal failure on exhaustion.
pub async fn retry_with_policy<T, E, Fut>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: impl FnMut() -> Fut,
) -> Result<T, RetriesExhausted<E>>
where
    E: std::fmt::Display,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %error,
                    "operation attempt failed"
                );
                if attempt >= max_attempts {
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                if let Some(delay) = policy.backoff.delay() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
