//! In-memory [`CatalogClient`] for tests and local runs.

use super::{CatalogClient, CatalogError};
use crate::model::ProductSnapshot;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A fixed product table. Unknown ids are `NotFound`; the whole catalog can be switched to
/// `Unavailable`. Counts remote calls so tests can tell cache hits from lookups.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Arc<Mutex<BTreeMap<String, ProductSnapshot>>>,
    unavailable: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(self, product: ProductSnapshot) -> Self {
        self.insert(product);
        self
    }

    pub fn insert(&self, product: ProductSnapshot) {
        self.products
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(product.id.clone(), product);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get_product` and `list_products` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("static catalog offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn get_product(&self, product_id: &str) -> Result<ProductSnapshot, CatalogError> {
        self.begin_call()?;
        self.products
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(product_id.to_string()))
    }

    async fn list_products(&self) -> Result<Vec<ProductSnapshot>, CatalogError> {
        self.begin_call()?;
        Ok(self
            .products
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect())
    }
}
