//! # Product Resolver
//!
//! Cache-first product lookup:
//!
//! 1. `GET product:{id}` from the cache. A hit that decodes is returned as-is.
//! 2. On a miss (or an unreadable entry, or a cache error) ask the catalog.
//! 3. Store the fresh snapshot under `product:{id}` with the short product TTL.
//!
//! Cache failures are logged and never turn into resolve failures. Catalog failures are
//! returned unchanged; there are no retries at this layer.

use super::{CatalogClient, CatalogError};
use crate::cache::{product_key, CachePolicy, CacheStore, PRODUCT_LIST_KEY};
use crate::model::ProductSnapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct ProductResolver {
    cache: Arc<dyn CacheStore>,
    catalog: Arc<dyn CatalogClient>,
    policy: CachePolicy,
}

impl ProductResolver {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        catalog: Arc<dyn CatalogClient>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            cache,
            catalog,
            policy,
        }
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, product_id: &str) -> Result<ProductSnapshot, CatalogError> {
        let key = product_key(product_id);
        if let Some(product) = self.cached::<ProductSnapshot>(&key).await {
            return Ok(product);
        }

        let product = self.catalog.get_product(product_id).await?;
        self.populate(&key, &product, self.policy.product_ttl).await;
        Ok(product)
    }

    /// Full product list, cached under `products:all`.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductSnapshot>, CatalogError> {
        if let Some(products) = self.cached::<Vec<ProductSnapshot>>(PRODUCT_LIST_KEY).await {
            return Ok(products);
        }

        let products = self.catalog.list_products().await?;
        self.populate(PRODUCT_LIST_KEY, &products, self.policy.product_list_ttl)
            .await;
        Ok(products)
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "Unreadable cache entry, treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "Could not encode cache entry");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &raw, ttl).await {
            warn!(key, error = %e, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::StaticCatalog;

    fn setup() -> (ProductResolver, MemoryCache, StaticCatalog) {
        let cache = MemoryCache::new();
        let catalog =
            StaticCatalog::new().with_product(ProductSnapshot::new("p1", "Widget", 9.5, 4));
        let resolver = ProductResolver::new(
            Arc::new(cache.clone()),
            Arc::new(catalog.clone()),
            CachePolicy::default(),
        );
        (resolver, cache, catalog)
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_with_short_ttl() {
        let (resolver, cache, catalog) = setup();

        let product = resolver.resolve("p1").await.unwrap();
        assert_eq!(product.price, 9.5);
        assert_eq!(catalog.calls(), 1);
        assert_eq!(
            cache.writes(),
            vec![("product:p1".to_string(), Duration::from_secs(60))]
        );

        // Second resolve is served from the cache.
        resolver.resolve("p1").await.unwrap();
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (resolver, cache, _) = setup();
        let result = resolver.resolve("p404").await;
        assert_eq!(result, Err(CatalogError::NotFound("p404".into())));
        assert!(cache.writes().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_is_a_miss() {
        let (resolver, cache, catalog) = setup();
        cache.seed("product:p1", "not json", Duration::from_secs(60));

        let product = resolver.resolve("p1").await.unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_outage_does_not_fail_resolve() {
        let (resolver, cache, _) = setup();
        cache.set_unavailable(true);
        assert!(resolver.resolve("p1").await.is_ok());
    }

    #[tokio::test]
    async fn test_catalog_outage_is_unavailable() {
        let (resolver, _, catalog) = setup();
        catalog.set_unavailable(true);
        assert!(matches!(
            resolver.resolve("p1").await,
            Err(CatalogError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_list_products_is_cached_for_ten_minutes() {
        let (resolver, cache, catalog) = setup();

        let products = resolver.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        resolver.list_products().await.unwrap();

        assert_eq!(catalog.calls(), 1);
        assert_eq!(
            cache.writes(),
            vec![("products:all".to_string(), Duration::from_secs(600))]
        );
    }
}
