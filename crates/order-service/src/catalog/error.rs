//! Error types for the product catalog.

use thiserror::Error;

/// Errors that can occur resolving products.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The catalog answered, but not with the product.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The catalog could not be reached in time, or answered with something unreadable.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}
