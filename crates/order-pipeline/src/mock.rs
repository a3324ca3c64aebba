//! # Test Doubles
//!
//! Helpers for testing jobs and pools deterministically.
//!
//! | Double | Replaces | Use |
//! |---|---|---|
//! | [`RecordingSleeper`] | [`TokioSleeper`](crate::TokioSleeper) | assert backoff delays without waiting |
//!
//! ```rust
//! use order_pipeline::mock::RecordingSleeper;
//! use order_pipeline::Sleeper;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sleeper = RecordingSleeper::new();
//!     sleeper.sleep(Duration::from_secs(1)).await;
//!     sleeper.sleep(Duration::from_secs(2)).await;
//!     assert_eq!(sleeper.total(), Duration::from_secs(3));
//! }
//! ```

use crate::retry::Sleeper;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A [`Sleeper`] that records requested delays and returns immediately.
///
/// Clones share the same record, so a clone can be injected into a pool context
/// while the test keeps the original for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner).push(duration);
        tokio::task::yield_now().await;
    }
}
