//! Bounded retry with a fixed backoff.
//!
//! Used while bootstrapping the database connection: the database container
//! often comes up after the generator, so the first few attempts are expected
//! to fail.

use std::future::Future;
use std::time::Duration;

/// Default number of attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default wait between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed wait after each failed attempt except the last.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// The operation failed on every attempt.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E> {
    /// Name of the operation, for logs.
    pub operation: String,
    /// Attempts made.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    /// Create a policy.
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Run `attempt` until it succeeds or the attempt budget is spent.
    ///
    /// Each failure is logged at `warn` with its attempt number.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] carrying the last error once every attempt
    /// has failed.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        mut attempt: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut number: u32 = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        operation,
                        attempt = number,
                        max_attempts,
                        error = %e,
                        "Attempt {number}/{max_attempts} failed"
                    );
                    if number >= max_attempts {
                        return Err(RetryExhausted {
                            operation: operation.to_owned(),
                            attempts: number,
                            last_error: e,
                        });
                    }
                }
            }
            number = number.saturating_add(1);
            if !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }
    }
}
