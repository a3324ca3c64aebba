//! Error types for order intake and queries.

use crate::catalog::CatalogError;
use crate::model::OrderId;
use crate::store::StoreError;
use order_pipeline::PipelineError;
use thiserror::Error;

/// Errors returned synchronously to callers of [`OrderService`](super::OrderService).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The request itself is malformed (blank product id, zero quantity).
    #[error("Order validation error: {0}")]
    Validation(String),

    /// The catalog does not know the product.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The catalog could not be consulted.
    #[error("Product catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Product out of stock: {0}")]
    OutOfStock(String),

    /// The admission queue is full. Nothing was enqueued; the caller may retry later.
    #[error("Order intake overloaded (queue capacity {capacity})")]
    Overloaded { capacity: usize },

    /// The pipeline has been shut down and admits nothing.
    #[error("Order intake is shutting down")]
    ShuttingDown,

    /// A read from the durable store failed.
    #[error("Order database error: {0}")]
    Store(String),
}

impl From<CatalogError> for OrderError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(id) => OrderError::NotFound(id),
            CatalogError::Unavailable(reason) => OrderError::Unavailable(reason),
        }
    }
}

impl From<PipelineError> for OrderError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::QueueFull { capacity } => OrderError::Overloaded { capacity },
            PipelineError::QueueClosed | PipelineError::WorkerPanicked(_) => {
                OrderError::ShuttingDown
            }
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        OrderError::Store(e.to_string())
    }
}

/// Terminal failure of an admitted order: every persistence attempt failed.
///
/// Only ever logged by the worker pool; the caller already got its order back.
#[derive(Debug, Error)]
#[error("Order {order_id} not persisted after {attempts} attempts: {last}")]
pub struct PersistenceFailure {
    pub order_id: OrderId,
    pub attempts: u32,
    pub last: StoreError,
}
