//! In-process [`CacheStore`] with TTL expiry.
//!
//! Expiry uses `tokio::time::Instant`, so tests can move time forward with
//! `tokio::time::advance` on a paused clock. Every `set` and `delete` is also recorded so
//! tests can assert on what the pipeline wrote and invalidated.

use super::{CacheError, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, (String, Instant)>,
    writes: Vec<(String, Duration)>,
    deletions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<Mutex<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`CacheError::Backend`] (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts an entry directly, bypassing the write log.
    pub fn seed(&self, key: &str, value: &str, ttl: Duration) {
        let mut inner = self.lock();
        inner
            .entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }

    /// True if `key` holds a live entry.
    pub fn contains(&self, key: &str) -> bool {
        let inner = self.lock();
        inner
            .entries
            .get(key)
            .is_some_and(|(_, expires)| *expires > Instant::now())
    }

    /// Every `(key, ttl)` passed to `set`, in call order.
    pub fn writes(&self) -> Vec<(String, Duration)> {
        self.lock().writes.clone()
    }

    /// Every key passed to `delete`, in call order.
    pub fn deletions(&self) -> Vec<String> {
        self.lock().deletions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the map is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Backend("memory cache marked unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        let mut inner = self.lock();
        match inner.entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                inner.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        let mut inner = self.lock();
        inner
            .entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        inner.writes.push((key.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        let mut inner = self.lock();
        inner.entries.remove(key);
        inner.deletions.push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok_and_recorded() {
        let cache = MemoryCache::new();
        cache.delete("missing").await.unwrap();
        assert_eq!(cache.deletions(), vec!["missing".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_cache_errors() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert!(matches!(cache.get("k").await, Err(CacheError::Backend(_))));
        cache.set_unavailable(false);
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
