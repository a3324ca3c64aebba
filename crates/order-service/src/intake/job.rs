//! The unit of work the worker pool runs for every admitted order.

use super::error::PersistenceFailure;
use crate::cache::{order_list_key, CacheStore};
use crate::events::OrderEventPublisher;
use crate::model::{Order, OrderId};
use crate::store::OrderStore;
use async_trait::async_trait;
use order_pipeline::{retry, Job, RetryPolicy, Sleeper};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies shared by every worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub store: Arc<dyn OrderStore>,
    pub cache: Arc<dyn CacheStore>,
    pub publisher: OrderEventPublisher,
    pub retry: RetryPolicy,
    pub sleeper: Arc<dyn Sleeper>,
}

/// Wraps exactly one admitted [`Order`].
#[derive(Debug)]
pub struct OrderJob {
    order: Order,
}

impl OrderJob {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }
}

#[async_trait]
impl Job for OrderJob {
    type Id = OrderId;
    type Context = WorkerContext;
    type Error = PersistenceFailure;

    fn id(&self) -> OrderId {
        self.order.id()
    }

    /// Persist with retry, invalidate the product's order list, publish `order.created`.
    ///
    /// Only persistence can fail the job. Cache and publish failures are logged and the
    /// job still counts as done.
    async fn process(self, ctx: &WorkerContext) -> Result<(), PersistenceFailure> {
        let order = self.order;
        let order_id = order.id();
        let product_id = order.product_id().to_string();

        let store = &ctx.store;
        let pending = &order;
        retry(&ctx.retry, ctx.sleeper.as_ref(), move |attempt| async move {
            debug!(%order_id, attempt, "Persisting order");
            store.create(pending).await
        })
        .await
        .map_err(|e| PersistenceFailure {
            order_id,
            attempts: e.attempts,
            last: e.last,
        })?;
        info!(%order_id, product_id = %product_id, "Order persisted");

        let key = order_list_key(&product_id);
        if let Err(e) = ctx.cache.delete(&key).await {
            warn!(%order_id, key = %key, error = %e, "Order list invalidation failed");
        }

        if let Err(e) = ctx.publisher.order_created(&order).await {
            warn!(%order_id, error = %e, "Order event not published");
        }

        Ok(())
    }
}
