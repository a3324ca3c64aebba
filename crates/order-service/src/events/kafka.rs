//! Kafka-backed [`Broker`], enabled by the `kafka` feature.

use super::{Broker, PublishError};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use tracing::{debug, info};

/// Enqueues events on an `rdkafka` producer without awaiting delivery.
///
/// The routing key becomes the record key.
#[derive(Clone)]
pub struct KafkaBroker {
    producer: FutureProducer,
}

impl KafkaBroker {
    /// # Errors
    ///
    /// Returns [`PublishError::Broker`] if the producer cannot be created.
    pub fn connect(brokers: &str) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "1")
            .create()
            .map_err(|e| PublishError::Broker(format!("Failed to create producer: {e}")))?;
        info!(brokers, "Kafka producer created");
        Ok(Self { producer })
    }
}

#[async_trait]
impl Broker for KafkaBroker {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).payload(&payload).key(routing_key);
        // The delivery future is dropped: delivery is at-most-once.
        self.producer
            .send_result(record)
            .map_err(|(e, _)| PublishError::Broker(e.to_string()))?;
        debug!(topic, routing_key, "Event enqueued on Kafka producer");
        Ok(())
    }
}
