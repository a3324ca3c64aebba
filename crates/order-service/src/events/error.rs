//! Error types for event publication.

use thiserror::Error;

/// Errors that can occur handing an event to the broker.
///
/// Publication is best-effort: these are logged by the caller and never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PublishError {
    #[error("Event encoding failed: {0}")]
    Encode(String),

    /// The broker refused the message or could not be reached.
    #[error("Broker rejected event: {0}")]
    Broker(String),
}
