//! # Job Trait
//!
//! The `Job` trait is the contract every unit of queued work implements to be processed by
//! the generic [`WorkerPool`](crate::WorkerPool). The pool owns the plumbing (queue, worker
//! loops, logging, shutdown) and the job owns the business logic.
//!
//! # Ownership
//! `process` takes `self` by value. A job is moved out of the queue into exactly one worker,
//! which consumes it. When `process` returns the job is gone, whatever the outcome, so there
//! is no way for two workers to observe the same job.
//!
//! # Context
//! Dependencies are injected through the associated `Context` type, shared by every worker of
//! a pool. The context is handed to [`WorkerPool::start`](crate::WorkerPool::start), not to the
//! job, so jobs stay plain data while they sit in the queue.

use async_trait::async_trait;
use std::fmt::{Debug, Display};

#[async_trait]
pub trait Job: Send + Debug + Sized + 'static {
    /// Identifier used in log lines (e.g. an order id).
    type Id: Display + Send + Sync;

    /// Shared dependencies injected into every worker.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync + 'static;

    /// Terminal failure of a job. Returned only once the job has given up;
    /// the worker logs it and drops the job.
    type Error: std::error::Error + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    /// Run the job to completion. Retries, if any, happen inside this call.
    async fn process(self, ctx: &Self::Context) -> Result<(), Self::Error>;
}
