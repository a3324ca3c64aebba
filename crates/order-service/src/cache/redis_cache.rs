//! Redis-backed [`CacheStore`].

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Cache on a shared Redis instance.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure; it is cheap
/// to clone, so each call works on its own clone.
#[derive(Clone)]
pub struct RedisCache {
    conn_manager: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the URL is invalid or the first connection fails.
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Backend(format!("Failed to create Redis client: {e}")))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::Backend(format!("Failed to create Redis connection manager: {e}"))
        })?;
        info!("Connected to Redis cache");
        Ok(Self { conn_manager })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn_manager.clone();
        let value: Option<String> = conn.get(key).await?;
        debug!(key, hit = value.is_some(), "Redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn_manager.clone();
        let seconds = ttl_seconds(ttl);
        let _: () = conn.set_ex(key, value, seconds).await?;
        debug!(key, ttl_secs = seconds, "Redis SETEX");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn_manager.clone();
        let _: () = conn.del(key).await?;
        debug!(key, "Redis DEL");
        Ok(())
    }
}

/// Whole seconds for SETEX, rounded up. SETEX rejects 0, so the floor is one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    (ttl.as_secs_f64().ceil() as u64).max(1)
}
