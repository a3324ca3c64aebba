//! In-process [`OrderStore`].
//!
//! Besides holding orders it lets tests script failures: [`MemoryOrderStore::fail_next`]
//! makes the next `n` calls to `create` fail, and [`MemoryOrderStore::create_attempts`]
//! counts every call, failed or not.

use super::{OrderStore, StoreError};
use crate::model::Order;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryOrderStore {
    orders: Arc<Mutex<Vec<Order>>>,
    failures_left: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
    reads_unavailable: Arc<AtomicBool>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` `create` calls fail.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Makes every read (`query_by_product`, `list_all`) fail.
    pub fn set_reads_unavailable(&self, unavailable: bool) {
        self.reads_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn create_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored order, in insertion order.
    pub fn orders(&self) -> Vec<Order> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Order>> {
        self.orders.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.reads_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database("memory store reads disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let injected = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Database(format!(
                "injected failure on write {attempt}"
            )));
        }
        self.lock().push(order.clone());
        Ok(())
    }

    async fn query_by_product(&self, product_id: &str) -> Result<Vec<Order>, StoreError> {
        self.check_reads()?;
        Ok(self
            .lock()
            .iter()
            .filter(|order| order.product_id() == product_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.check_reads()?;
        Ok(self.orders())
    }

    async fn delete_all(&self) -> Result<Vec<String>, StoreError> {
        let removed = std::mem::take(&mut *self.lock());
        let products: BTreeSet<String> = removed
            .iter()
            .map(|order| order.product_id().to_string())
            .collect();
        Ok(products.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failures_then_success() {
        let store = MemoryOrderStore::new();
        store.fail_next(2);
        let order = Order::new("p1", 1.0, 1);

        assert!(store.create(&order).await.is_err());
        assert!(store.create(&order).await.is_err());
        assert!(store.create(&order).await.is_ok());

        assert_eq!(store.create_attempts(), 3);
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_query_filters_by_product() {
        let store = MemoryOrderStore::new();
        store.create(&Order::new("p1", 1.0, 1)).await.unwrap();
        store.create(&Order::new("p2", 1.0, 1)).await.unwrap();
        store.create(&Order::new("p1", 2.0, 1)).await.unwrap();

        let orders = store.query_by_product("p1").await.unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|o| o.product_id() == "p1"));
    }

    #[tokio::test]
    async fn test_delete_all_returns_distinct_products() {
        let store = MemoryOrderStore::new();
        for product in ["p2", "p1", "p2"] {
            store.create(&Order::new(product, 1.0, 1)).await.unwrap();
        }

        let products = store.delete_all().await.unwrap();
        assert_eq!(products, vec!["p1".to_string(), "p2".to_string()]);
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
