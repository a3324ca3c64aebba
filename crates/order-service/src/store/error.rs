//! Error types for the durable order store.

use thiserror::Error;

/// Errors that can occur reading or writing orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or rejected the statement.
    #[error("Order database error: {0}")]
    Database(String),

    /// A stored row could not be turned back into an [`Order`](crate::model::Order).
    #[error("Corrupt order row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
