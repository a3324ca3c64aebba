//! # Order Events
//!
//! After an order is persisted, workers announce it on the broker:
//!
//! - topic / exchange: `events` (configurable)
//! - routing key: `order.created`
//! - payload: the order's JSON wire form
//!
//! Delivery is at-most-once. The publisher hands the message to the broker client and
//! returns without waiting for an acknowledgement; there is no outbox and no retry.
//!
//! Broker backends implement [`Broker`]:
//!
//! | Backend | When |
//! |---|---|
//! | [`AmqpBroker`] | `BROKER_URL` (or `RABBITMQ_URL`) is an `amqp://` / `amqps://` URL |
//! | [`KafkaBroker`](kafka::KafkaBroker) | `kafka` feature and any other `BROKER_URL` |
//! | [`LogBroker`] | no broker configured; events are only logged |
//! | [`MemoryBroker`] | tests |

pub mod amqp;
pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;

pub use amqp::{is_amqp_url, AmqpBroker};
pub use error::PublishError;
pub use memory::{LogBroker, MemoryBroker, PublishedEvent};

use crate::model::Order;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

pub const ORDER_CREATED: &str = "order.created";
pub const DEFAULT_EXCHANGE: &str = "events";

/// Fire-and-forget publish sink.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError>;
}

/// Publishes `order.created` notifications.
#[derive(Clone)]
pub struct OrderEventPublisher {
    broker: Arc<dyn Broker>,
    exchange: String,
}

impl OrderEventPublisher {
    pub fn new(broker: Arc<dyn Broker>, exchange: impl Into<String>) -> Self {
        Self {
            broker,
            exchange: exchange.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub async fn order_created(&self, order: &Order) -> Result<(), PublishError> {
        let payload =
            serde_json::to_vec(order).map_err(|e| PublishError::Encode(e.to_string()))?;
        self.broker
            .publish(&self.exchange, ORDER_CREATED, payload)
            .await?;
        debug!(order_id = %order.id(), exchange = %self.exchange, "Order event handed to broker");
        Ok(())
    }
}
