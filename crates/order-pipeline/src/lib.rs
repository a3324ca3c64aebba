//! # Order Pipeline
//!
//! Generic building blocks for an asynchronous intake pipeline: a bounded admission queue
//! that sheds load instead of blocking, a fixed pool of workers that consume it, and a
//! bounded retry policy those workers can use.
//!
//! Nothing in this crate knows about orders. The domain plugs in by implementing [`Job`].
//!
//! ## Why a Bounded Queue + Worker Pool?
//!
//! - **Backpressure without blocking**: producers call [`AdmissionQueue::try_submit`], which
//!   never waits. A full queue is a synchronous, typed rejection ([`PipelineError::QueueFull`])
//!   the caller can turn into "try again later".
//! - **Fixed concurrency**: `W` workers means at most `W` jobs touch downstream resources at
//!   once, regardless of request rate.
//! - **Exclusive ownership**: a job is moved into exactly one worker and consumed there.
//!
//! ## Core Concepts
//!
//! | Item | Role |
//! |---|---|
//! | [`Job`] | Unit of work: id, shared `Context`, terminal `Error`, `process(self)` |
//! | [`AdmissionQueue`] / [`JobReceiver`] | Producer / consumer halves of the bounded MPMC queue |
//! | [`WorkerPool`] / [`PoolHandle`] | Not-yet-started / running pool, with drain-and-join shutdown |
//! | [`RetryPolicy`] / [`retry()`](retry::retry) / [`Sleeper`] | Linear backoff as a pure function plus an injectable wait |
//! | [`mock`] | Test doubles |
//!
//! ## Context Injection Pattern
//!
//! Dependencies are handed to [`WorkerPool::start`], not to each job. Jobs stay plain data
//! while queued, and every worker shares one `Arc<Context>`:
//!
//! ```rust,ignore
//! let (pool, queue) = WorkerPool::<OrderJob>::new(config.queue_capacity);
//! let handle = pool.start(config.workers, WorkerContext { store, cache, publisher, .. });
//! // hand `queue` to the request side
//! handle.shutdown().await?;
//! ```
//!
//! ## Concurrency Model
//!
//! - One Tokio task per worker, all alive until shutdown
//! - Queue push is try-then-fail; queue pop waits
//! - The queue's internal lock is never held across an `.await`
//! - Once admitted, a job cannot be cancelled; it runs to success or to its terminal error
//!
//! ## Lifecycle
//!
//! 1. **Start** - `WorkerPool::new` + `start`
//! 2. **Signal stop** - `shutdown` closes the queue; new submissions get `QueueClosed`
//! 3. **Drain** - workers keep consuming until the queue is empty
//! 4. **Join** - every worker task is awaited; a dead worker task surfaces as `WorkerPanicked`
//!
//! A panicking job does not take its worker down: the panic is caught, logged and counted.

pub mod error;
pub mod job;
pub mod mock;
pub mod queue;
pub mod retry;
pub mod tracing;
pub mod worker;

// Re-export core types for convenience
pub use error::PipelineError;
pub use job::Job;
pub use queue::{AdmissionQueue, JobReceiver};
pub use retry::{retry, RetryExhausted, RetryPolicy, Sleeper, TokioSleeper};
pub use worker::{PoolCounters, PoolHandle, WorkerPool};
