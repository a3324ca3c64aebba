//! # System Lifecycle
//!
//! Wires the adapters into a running pipeline and takes it down again.
//!
//! ## Start
//!
//! 1. Build the shared cache, store, catalog and broker handles (see `main.rs` for the
//!    env-driven choice between real and in-memory adapters).
//! 2. [`OrderSystem::start`] creates the admission queue, injects a [`WorkerContext`]
//!    into the worker pool, and hands the producer half of the queue to [`OrderService`].
//!
//! ```rust,ignore
//! let system = OrderSystem::start(deps, PipelineSettings::default());
//! let order = system.service.create_order("p1", 1).await?;
//! system.shutdown().await?;
//! ```
//!
//! ## Shutdown
//!
//! 1. Close the queue: further `create_order` calls fail with `ShuttingDown`
//! 2. Workers drain every job already admitted, including their retries
//! 3. Join all worker tasks; a worker task that died surfaces as an error (panicking jobs
//!    are caught and logged by their worker when they happen)
//!
//! [`WorkerContext`]: crate::intake::WorkerContext
//! [`OrderService`]: crate::intake::OrderService

pub mod order_system;

pub use order_system::*;
