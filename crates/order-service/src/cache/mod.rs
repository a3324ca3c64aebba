//! # Shared Cache
//!
//! A string key/value cache with per-entry TTL, used for two things:
//!
//! | Key | Value | TTL | Written by |
//! |---|---|---|---|
//! | `product:{productId}` | JSON [`ProductSnapshot`](crate::model::ProductSnapshot) | 60 s | product resolver |
//! | `products:all` | JSON array of snapshots | 10 min | product resolver |
//! | `orders:product:{productId}` | JSON array of [`Order`](crate::model::Order) | 10 min | order-list query |
//!
//! The order-list key is deleted whenever an order for that product is admitted or
//! persisted, so a reader never keeps serving a list that is missing a committed order for
//! longer than one query.
//!
//! Two backends implement [`CacheStore`]: [`MemoryCache`] (tests and single-node runs) and
//! [`RedisCache`].

pub mod error;
pub mod memory;
pub mod redis_cache;

pub use error::CacheError;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use std::time::Duration;

/// Key/value access to the shared cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value under `key`, or `None` if it is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Removes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

pub fn product_key(product_id: &str) -> String {
    format!("product:{product_id}")
}

pub fn order_list_key(product_id: &str) -> String {
    format!("orders:product:{product_id}")
}

pub const PRODUCT_LIST_KEY: &str = "products:all";

/// TTLs applied by the cache writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub product_ttl: Duration,
    pub product_list_ttl: Duration,
    pub order_list_ttl: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            product_ttl: Duration::from_secs(60),
            product_list_ttl: Duration::from_secs(600),
            order_list_ttl: Duration::from_secs(600),
        }
    }
}
