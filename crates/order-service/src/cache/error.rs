//! Error types for the shared cache.

use thiserror::Error;

/// Errors that can occur talking to the cache.
///
/// Cache failures never fail a request on their own: readers treat them as a miss and
/// writers log and move on.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheError {
    /// The cache could not be reached or the command failed.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}
