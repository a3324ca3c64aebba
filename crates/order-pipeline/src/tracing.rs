//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate for any binary
//! built on this framework.
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable (default `info`)
//! - **Compact format** that hides module paths; log lines carry `job_type`, `worker` and
//!   domain ids as structured fields instead
//!
//! ```bash
//! # Lifecycle and completed work
//! RUST_LOG=info cargo run
//!
//! # Cache hits/misses, payloads, per-job pickup
//! RUST_LOG=debug cargo run
//!
//! # Only the pipeline internals
//! RUST_LOG=order_pipeline=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! ```text
//! INFO create_order{product_id="p1" quantity=1}: Order admitted order_id=6f1c… total_price=25.0
//! WARN Attempt failed, backing off attempt=1 delay_ms=1000 error="Order database error: …"
//! INFO Operation succeeded after retry attempt=2
//! INFO Order persisted order_id=6f1c… product_id=p1
//! WARN Order event not published order_id=6f1c… error="Broker rejected event: …"
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
