//! # Pipeline Errors
//!
//! Errors raised by the pipeline machinery itself (admission and worker lifecycle).
//! Job-specific failures are defined by each [`Job`](crate::Job) implementation.

/// Errors that can occur within the pipeline framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PipelineError {
    #[error("Admission queue full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("Admission queue closed")]
    QueueClosed,
    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),
}
