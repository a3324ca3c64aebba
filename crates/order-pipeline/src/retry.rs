//! # Bounded Retry with Linear Backoff
//!
//! Retrying is split in two so the timing can be tested without real sleeps:
//!
//! - [`RetryPolicy::delay_after`] is a pure function from a failed attempt number to the
//!   delay before the next attempt.
//! - [`Sleeper`] performs the wait. Production code uses [`TokioSleeper`]; tests inject
//!   [`RecordingSleeper`](crate::mock::RecordingSleeper), which records the requested delays.
//!
//! ```rust
//! use order_pipeline::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::linear(3, Duration::from_secs(1));
//! assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
//! assert_eq!(policy.delay_after(2), Some(Duration::from_secs(2)));
//! assert_eq!(policy.delay_after(3), None);
//! ```

use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Linear backoff: after failed attempt `n` wait `n × unit`, up to `max_attempts` attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub const fn linear(max_attempts: u32, unit: Duration) -> Self {
        Self { max_attempts, unit }
    }

    /// Delay to wait after attempt `attempt` (1-based) failed.
    ///
    /// Returns `None` when that was the last allowed attempt.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        Some(self.unit.saturating_mul(attempt))
    }

    /// Sum of all delays when every attempt fails.
    pub fn worst_case_wait(&self) -> Duration {
        (1..self.max_attempts)
            .filter_map(|attempt| self.delay_after(attempt))
            .sum()
    }
}

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real waiting on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Every attempt failed. Carries the error of the final attempt.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `operation` until it succeeds or the policy runs out of attempts.
///
/// `operation` receives the 1-based attempt number.
///
/// # Errors
/// Returns [`RetryExhausted`] with the last error once `policy.max_attempts` attempts failed.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => match policy.delay_after(attempt) {
                Some(delay) => {
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, backing off"
                    );
                    drop(error);
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last: error,
                    })
                }
            },
        }
    }
}
