use crate::cache::{CachePolicy, CacheStore};
use crate::catalog::{CatalogClient, ProductResolver};
use crate::events::{Broker, OrderEventPublisher, DEFAULT_EXCHANGE};
use crate::intake::{OrderJob, OrderService, WorkerContext};
use crate::store::OrderStore;
use order_pipeline::{
    PipelineError, PoolCounters, PoolHandle, RetryPolicy, Sleeper, TokioSleeper, WorkerPool,
};
use std::sync::Arc;
use tracing::info;

/// External collaborators of the pipeline.
#[derive(Clone)]
pub struct Dependencies {
    pub store: Arc<dyn OrderStore>,
    pub cache: Arc<dyn CacheStore>,
    pub catalog: Arc<dyn CatalogClient>,
    pub broker: Arc<dyn Broker>,
    pub sleeper: Arc<dyn Sleeper>,
}

impl Dependencies {
    /// Uses [`TokioSleeper`] for retry backoff.
    pub fn new(
        store: Arc<dyn OrderStore>,
        cache: Arc<dyn CacheStore>,
        catalog: Arc<dyn CatalogClient>,
        broker: Arc<dyn Broker>,
    ) -> Self {
        Self {
            store,
            cache,
            catalog,
            broker,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}

/// Sizing and timing of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub queue_capacity: usize,
    pub workers: usize,
    pub retry: RetryPolicy,
    pub cache: CachePolicy,
    pub exchange: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 5000,
            workers: 8,
            retry: RetryPolicy::default(),
            cache: CachePolicy::default(),
            exchange: DEFAULT_EXCHANGE.to_string(),
        }
    }
}

/// A running order pipeline.
pub struct OrderSystem {
    pub service: OrderService,
    pool: PoolHandle<OrderJob>,
}

impl OrderSystem {
    /// Creates the queue, starts the workers and returns the caller-facing service.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(deps: Dependencies, settings: PipelineSettings) -> Self {
        let (pool, queue) = WorkerPool::<OrderJob>::new(settings.queue_capacity);

        let context = WorkerContext {
            store: deps.store.clone(),
            cache: deps.cache.clone(),
            publisher: OrderEventPublisher::new(deps.broker, settings.exchange.clone()),
            retry: settings.retry,
            sleeper: deps.sleeper,
        };
        let pool = pool.start(settings.workers, context);

        let resolver = ProductResolver::new(deps.cache.clone(), deps.catalog, settings.cache);
        let service = OrderService::new(resolver, deps.cache, deps.store, queue, settings.cache);

        info!(
            queue_capacity = settings.queue_capacity,
            workers = settings.workers,
            max_attempts = settings.retry.max_attempts,
            "Order system started"
        );
        Self { service, pool }
    }

    pub fn counters(&self) -> PoolCounters {
        self.pool.counters()
    }

    /// Stops admission, drains admitted orders and joins the workers.
    ///
    /// # Errors
    /// Returns [`PipelineError::WorkerPanicked`] if a worker died.
    pub async fn shutdown(self) -> Result<(), PipelineError> {
        info!("Shutting down order system");
        drop(self.service);
        self.pool.shutdown().await?;
        info!("Order system shut down");
        Ok(())
    }
}
