//! # Order Intake
//!
//! The synchronous half of the pipeline, plus the read paths.
//!
//! ## Creating an order
//!
//! [`OrderService::create_order`] runs entirely on the caller's task:
//!
//! 1. Validate the input (non-blank product id without `/` or control characters,
//!    quantity ≥ 1).
//! 2. Resolve the product, cache-first ([`ProductResolver`]).
//! 3. Reject if the product has no stock.
//! 4. Build the [`Order`] (fresh id, `PENDING`, `price × quantity`).
//! 5. Delete `orders:product:{id}` from the cache.
//! 6. Try to admit an [`OrderJob`] into the bounded queue. Never waits.
//!
//! The order is returned as soon as it is admitted, **before it is durable**. Persistence,
//! the second cache invalidation and the `order.created` event happen later on a worker
//! (see [`job`]). If every persistence attempt fails the order is logged and dropped; the
//! caller is not told.
//!
//! ## Reading orders
//!
//! [`OrderService::get_orders_by_product_id`] is read-through: a cache hit is returned
//! as stored; a miss reads the store and repopulates the cache.

pub mod error;
pub mod job;

pub use error::{OrderError, PersistenceFailure};
pub use job::{OrderJob, WorkerContext};

use crate::cache::{order_list_key, CachePolicy, CacheStore};
use crate::catalog::ProductResolver;
use crate::model::{Order, ProductSnapshot};
use crate::store::OrderStore;
use order_pipeline::AdmissionQueue;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Caller-facing API of the order pipeline. Cheap to clone; every request handler gets one.
#[derive(Clone)]
pub struct OrderService {
    resolver: ProductResolver,
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn OrderStore>,
    queue: AdmissionQueue<OrderJob>,
    policy: CachePolicy,
}

impl OrderService {
    pub fn new(
        resolver: ProductResolver,
        cache: Arc<dyn CacheStore>,
        store: Arc<dyn OrderStore>,
        queue: AdmissionQueue<OrderJob>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            resolver,
            cache,
            store,
            queue,
            policy,
        }
    }

    /// Validates, prices and admits a new order.
    ///
    /// Returns the order once it is queued; it is not yet persisted.
    ///
    /// # Errors
    /// - [`OrderError::Validation`] - blank `product_id`, one containing `/` or control
    ///   characters, or zero `quantity`
    /// - [`OrderError::NotFound`] / [`OrderError::Unavailable`] - product resolution failed
    /// - [`OrderError::OutOfStock`] - the product's stock is zero or negative
    /// - [`OrderError::Overloaded`] - the admission queue is full
    /// - [`OrderError::ShuttingDown`] - the pipeline no longer admits work
    #[instrument(skip(self))]
    pub async fn create_order(&self, product_id: &str, quantity: u32) -> Result<Order, OrderError> {
        validate_product_id(product_id)?;
        if quantity == 0 {
            return Err(OrderError::Validation("quantity must be at least 1".into()));
        }

        let product = self.resolver.resolve(product_id).await?;
        if !product.in_stock() {
            info!(stock = product.quantity, "Rejecting order, product out of stock");
            return Err(OrderError::OutOfStock(product_id.to_string()));
        }

        let order = Order::new(product_id, product.price, quantity);
        self.invalidate_order_list(product_id).await;

        self.queue
            .try_submit(OrderJob::new(order.clone()))
            .map_err(|e| {
                warn!(error = %e, depth = self.queue.depth(), "Order not admitted");
                OrderError::from(e)
            })?;

        info!(order_id = %order.id(), total_price = order.total_price(), "Order admitted");
        Ok(order)
    }

    /// Orders for one product, read through the order-list cache.
    ///
    /// # Errors
    /// [`OrderError::Store`] if the cache misses and the store read fails.
    #[instrument(skip(self))]
    pub async fn get_orders_by_product_id(&self, product_id: &str) -> Result<Vec<Order>, OrderError> {
        let key = order_list_key(product_id);
        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Order>>(&raw) {
                Ok(orders) => {
                    debug!(count = orders.len(), "Order list cache hit");
                    return Ok(orders);
                }
                Err(e) => warn!(error = %e, "Unreadable order list in cache, reading store"),
            },
            Ok(None) => debug!("Order list cache miss"),
            Err(e) => warn!(error = %e, "Cache read failed, reading store"),
        }

        let orders = self.store.query_by_product(product_id).await?;
        match serde_json::to_string(&orders) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(&key, &raw, self.policy.order_list_ttl).await {
                    warn!(error = %e, "Order list cache population failed");
                }
            }
            Err(e) => warn!(error = %e, "Could not encode order list for cache"),
        }
        Ok(orders)
    }

    /// Every product in the catalog, cache-first.
    ///
    /// # Errors
    /// [`OrderError::Unavailable`] if the catalog cannot be consulted.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductSnapshot>, OrderError> {
        Ok(self.resolver.list_products().await?)
    }

    /// Every persisted order, straight from the store.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_all().await?)
    }

    /// Deletes every order, then drops the cached order list of each affected product.
    #[instrument(skip(self))]
    pub async fn delete_all_orders(&self) -> Result<(), OrderError> {
        let products = self.store.delete_all().await?;
        info!(products = products.len(), "All orders deleted");
        for product_id in &products {
            self.invalidate_order_list(product_id).await;
        }
        Ok(())
    }

    /// Jobs admitted but not yet picked up by a worker.
    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }

    async fn invalidate_order_list(&self, product_id: &str) {
        let key = order_list_key(product_id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(key = %key, error = %e, "Order list invalidation failed");
        }
    }
}

/// Product ids are opaque, but they end up in cache keys and catalog URLs.
fn validate_product_id(product_id: &str) -> Result<(), OrderError> {
    if product_id.trim().is_empty() {
        return Err(OrderError::Validation("productId is required".into()));
    }
    if product_id.contains('/') || product_id.chars().any(char::is_control) {
        return Err(OrderError::Validation(format!(
            "productId {product_id:?} contains '/' or control characters"
        )));
    }
    Ok(())
}
