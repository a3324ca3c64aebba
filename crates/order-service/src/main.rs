use order_pipeline::tracing::setup_tracing;
use order_service::cache::{CacheStore, MemoryCache, RedisCache};
use order_service::catalog::HttpCatalog;
use order_service::config::AppConfig;
use order_service::events::{is_amqp_url, AmqpBroker, Broker, LogBroker};
use order_service::lifecycle::{Dependencies, OrderSystem};
use order_service::store::{MemoryOrderStore, OrderStore, PostgresOrderStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = AppConfig::from_env()?;
    info!(port = config.port, "Starting order service");

    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => Arc::new(PostgresOrderStore::connect(url, config.pool).await?),
        None => {
            warn!("DATABASE_URL not set, orders are kept in memory only");
            Arc::new(MemoryOrderStore::new())
        }
    };

    let cache: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCache::connect(url).await?),
        None => {
            warn!("REDIS_URL not set, using an in-process cache");
            Arc::new(MemoryCache::new())
        }
    };

    let catalog = Arc::new(HttpCatalog::new(
        config.product_service_url.clone(),
        config.catalog_timeout,
    )?);
    let broker = build_broker(&config).await?;

    let system = OrderSystem::start(
        Dependencies::new(store, cache, catalog, broker),
        config.pipeline.clone(),
    );

    let app = order_service::http::router(system.service.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain admitted orders before exiting.
    system.shutdown().await?;
    info!("Order service stopped");
    Ok(())
}

async fn build_broker(config: &AppConfig) -> Result<Arc<dyn Broker>, Box<dyn std::error::Error>> {
    let exchange = &config.pipeline.exchange;
    match &config.broker_url {
        Some(url) if is_amqp_url(url) => Ok(Arc::new(AmqpBroker::connect(url, exchange).await?)),
        Some(brokers) => other_broker(brokers),
        None => {
            warn!("BROKER_URL not set, order events are only logged");
            Ok(Arc::new(LogBroker))
        }
    }
}

#[cfg(feature = "kafka")]
fn other_broker(brokers: &str) -> Result<Arc<dyn Broker>, Box<dyn std::error::Error>> {
    use order_service::events::kafka::KafkaBroker;

    Ok(Arc::new(KafkaBroker::connect(brokers)?))
}

#[cfg(not(feature = "kafka"))]
fn other_broker(_brokers: &str) -> Result<Arc<dyn Broker>, Box<dyn std::error::Error>> {
    warn!(
        "BROKER_URL is not an amqp:// URL and the kafka feature is disabled, \
         order events are only logged"
    );
    Ok(Arc::new(LogBroker))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
