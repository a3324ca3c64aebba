//! # Worker Pool
//!
//! A fixed set of long-lived workers consuming one [admission queue](crate::queue).
//!
//! # Usage Pattern
//!
//! 1.  **Create**: `WorkerPool::new(capacity)` returns the pool and the producer half of its
//!     queue. The producer can be cloned into every request handler.
//! 2.  **Start**: `pool.start(workers, context)` spawns the workers with their shared context.
//! 3.  **Stop**: `handle.shutdown().await` closes the queue, lets the workers drain every job
//!     that was already admitted, and joins them.
//!
//! ```rust
//! use async_trait::async_trait;
//! use order_pipeline::{Job, WorkerPool};
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Debug)]
//! struct Add(u32);
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("never fails")]
//! struct Never;
//!
//! #[async_trait]
//! impl Job for Add {
//!     type Id = u32;
//!     type Context = AtomicU32;
//!     type Error = Never;
//!
//!     fn id(&self) -> u32 { self.0 }
//!
//!     async fn process(self, total: &AtomicU32) -> Result<(), Never> {
//!         total.fetch_add(self.0, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (pool, queue) = WorkerPool::<Add>::new(16);
//!     let handle = pool.start(4, AtomicU32::new(0));
//!
//!     for n in 1..=4 {
//!         queue.try_submit(Add(n)).unwrap();
//!     }
//!
//!     let total = handle.context();
//!     handle.shutdown().await.unwrap();
//!     assert_eq!(total.load(Ordering::SeqCst), 10);
//! }
//! ```
//!
//! # Failure Model
//!
//! A job that returns `Err` is logged at `error` level and dropped; the worker moves on.
//! A job that panics is caught at the worker, logged at `error` level with the panic message,
//! counted in [`PoolCounters::panicked`] and dropped. The worker keeps running, so the pool
//! always has its full complement of workers. A worker task that dies anyway is reported by
//! [`PoolHandle::shutdown`].

use crate::error::PipelineError;
use crate::job::Job;
use crate::queue::{self, AdmissionQueue, JobReceiver};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Counters shared by all workers of a pool.
#[derive(Debug, Default)]
struct PoolStats {
    processed: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
}

impl PoolStats {
    fn snapshot(&self) -> PoolCounters {
        PoolCounters {
            processed: self.processed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            panicked: self.panicked.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time view of [`PoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolCounters {
    /// Jobs whose `process` returned `Ok`.
    pub processed: u64,
    /// Jobs whose `process` returned `Err` and were dropped.
    pub failed: u64,
    /// Jobs whose `process` panicked and were dropped.
    pub panicked: u64,
}

/// A pool that has not been started yet. Owns the consumer half of the queue.
pub struct WorkerPool<J: Job> {
    receiver: JobReceiver<J>,
}

impl<J: Job> WorkerPool<J> {
    /// Creates the pool and its bounded admission queue.
    pub fn new(capacity: usize) -> (Self, AdmissionQueue<J>) {
        let (queue, receiver) = queue::bounded(capacity);
        (Self { receiver }, queue)
    }

    /// Spawns `workers` tasks, each running an independent consume loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self, workers: usize, context: J::Context) -> PoolHandle<J> {
        let context = Arc::new(context);
        let stats = Arc::new(PoolStats::default());
        let handles = (0..workers)
            .map(|worker| {
                tokio::spawn(worker_loop(
                    worker,
                    self.receiver.clone(),
                    context.clone(),
                    stats.clone(),
                ))
            })
            .collect();

        PoolHandle {
            receiver: self.receiver,
            context,
            stats,
            handles,
        }
    }
}

/// A running pool.
pub struct PoolHandle<J: Job> {
    receiver: JobReceiver<J>,
    context: Arc<J::Context>,
    stats: Arc<PoolStats>,
    handles: Vec<JoinHandle<()>>,
}

impl<J: Job> PoolHandle<J> {
    pub fn counters(&self) -> PoolCounters {
        self.stats.snapshot()
    }

    /// The context shared by the workers.
    pub fn context(&self) -> Arc<J::Context> {
        self.context.clone()
    }

    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Jobs admitted but not yet picked up by a worker.
    pub fn depth(&self) -> usize {
        self.receiver.depth()
    }

    /// Stops admission, drains queued and in-flight jobs, then joins every worker.
    ///
    /// # Errors
    /// Returns [`PipelineError::WorkerPanicked`] if any worker task panicked. All workers are
    /// joined before the error is returned.
    pub async fn shutdown(self) -> Result<(), PipelineError> {
        info!(
            workers = self.handles.len(),
            queued = self.receiver.depth(),
            "Shutting down worker pool"
        );
        self.receiver.close();

        let mut failure = None;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task failed");
                failure.get_or_insert(PipelineError::WorkerPanicked(e.to_string()));
            }
        }

        let counters = self.stats.snapshot();
        match failure {
            Some(e) => Err(e),
            None => {
                info!(
                    processed = counters.processed,
                    failed = counters.failed,
                    panicked = counters.panicked,
                    "Worker pool stopped"
                );
                Ok(())
            }
        }
    }
}

async fn worker_loop<J: Job>(
    worker: usize,
    receiver: JobReceiver<J>,
    context: Arc<J::Context>,
    stats: Arc<PoolStats>,
) {
    // e.g. "OrderJob" instead of "order_service::intake::job::OrderJob"
    let job_type = std::any::type_name::<J>()
        .split("::")
        .last()
        .unwrap_or("Unknown");
    debug!(job_type, worker, "Worker started");

    while let Some(job) = receiver.recv().await {
        let id = job.id();
        debug!(job_type, worker, %id, "Job picked up");
        match AssertUnwindSafe(job.process(&context)).catch_unwind().await {
            Ok(Ok(())) => {
                stats.processed.fetch_add(1, Ordering::SeqCst);
                debug!(job_type, worker, %id, "Job done");
            }
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(job_type, worker, %id, error = %e, "Job failed permanently, dropped");
            }
            Err(payload) => {
                stats.panicked.fetch_add(1, Ordering::SeqCst);
                let panic = panic_message(payload.as_ref());
                error!(job_type, worker, %id, panic, "Job panicked, dropped");
            }
        }
    }

    debug!(job_type, worker, "Worker stopped");
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
