//! # Durable Order Store
//!
//! Orders are written by workers only, and read by the query path. The store is opaque
//! to the rest of the service: anything implementing [`OrderStore`] will do.
//!
//! - [`PostgresOrderStore`] - `sqlx` over a bounded Postgres pool
//! - [`MemoryOrderStore`] - in-process, with failure injection for tests

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryOrderStore;
pub use postgres::{PoolSettings, PostgresOrderStore};

use crate::model::Order;
use async_trait::async_trait;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts one order. Called at most once per successful job.
    async fn create(&self, order: &Order) -> Result<(), StoreError>;

    /// Every order for `product_id`, oldest first.
    async fn query_by_product(&self, product_id: &str) -> Result<Vec<Order>, StoreError>;

    /// Every order, oldest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Deletes every order and returns the distinct product ids that had at least one.
    async fn delete_all(&self) -> Result<Vec<String>, StoreError>;
}
