//! Brokers that never leave the process.

use super::{Broker, PublishError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub topic: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

/// Records every published event; can be switched to reject everything.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    events: Arc<Mutex<Vec<PublishedEvent>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Broker("memory broker is failing".into()));
        }
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(PublishedEvent {
                topic: topic.to_string(),
                routing_key: routing_key.to_string(),
                payload,
            });
        Ok(())
    }
}

/// Used when no broker is configured: events are written to the log and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBroker;

#[async_trait]
impl Broker for LogBroker {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        payload: Vec<u8>,
    ) -> Result<(), PublishError> {
        info!(
            topic,
            routing_key,
            payload = %String::from_utf8_lossy(&payload),
            "Event published (log only)"
        );
        Ok(())
    }
}
