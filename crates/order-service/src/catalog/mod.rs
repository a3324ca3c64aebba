//! # Product Catalog
//!
//! Products live in a remote catalog service. This module holds the client contract
//! ([`CatalogClient`]), its HTTP implementation, an in-memory stand-in, and the
//! [`ProductResolver`] that puts the shared cache in front of the catalog.

pub mod error;
pub mod http;
pub mod memory;
pub mod resolver;

pub use error::CatalogError;
pub use http::HttpCatalog;
pub use memory::StaticCatalog;
pub use resolver::ProductResolver;

use crate::model::ProductSnapshot;
use async_trait::async_trait;

/// Remote lookups. Implementations bound every call by their own timeout and never retry.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// # Errors
    /// [`CatalogError::NotFound`] on a non-success answer, [`CatalogError::Unavailable`] if
    /// the catalog could not be contacted or its body could not be decoded.
    async fn get_product(&self, product_id: &str) -> Result<ProductSnapshot, CatalogError>;

    /// # Errors
    /// [`CatalogError::Unavailable`] on any failure.
    async fn list_products(&self) -> Result<Vec<ProductSnapshot>, CatalogError>;
}
