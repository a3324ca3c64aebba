//! Postgres-backed [`OrderStore`].
//!
//! Table layout (camelCase columns are quoted):
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS orders (
//!     id            UUID PRIMARY KEY,
//!     "productId"   TEXT NOT NULL,
//!     "totalPrice"  DOUBLE PRECISION NOT NULL,
//!     status        TEXT NOT NULL,
//!     "createdAt"   TIMESTAMPTZ NOT NULL
//! );
//! ```

use super::{OrderStore, StoreError};
use crate::model::{Order, OrderId, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY,
    "productId" TEXT NOT NULL,
    "totalPrice" DOUBLE PRECISION NOT NULL,
    status TEXT NOT NULL,
    "createdAt" TIMESTAMPTZ NOT NULL
)"#;

const INDEX: &str = r#"CREATE INDEX IF NOT EXISTS orders_product_id_idx ON orders ("productId")"#;

const COLUMNS: &str = r#"id, "productId", "totalPrice", status, "createdAt""#;

type OrderRow = (Uuid, String, f64, String, DateTime<Utc>);

/// Connection pool bounds shared by request handlers and workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 10,
            max_lifetime: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a bounded pool and makes sure the `orders` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection or the schema statement fails.
    pub async fn connect(database_url: &str, settings: PoolSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .max_lifetime(Some(settings.max_lifetime))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Connected to order database"
        );
        Ok(store)
    }

    /// Creates the `orders` table and its product index if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if either statement fails.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        sqlx::query(INDEX).execute(&self.pool).await?;
        Ok(())
    }

    fn decode(row: OrderRow) -> Result<Order, StoreError> {
        let (id, product_id, total_price, status, created_at) = row;
        let status = status.parse::<OrderStatus>().map_err(StoreError::Decode)?;
        Ok(Order::from_parts(
            OrderId(id),
            product_id,
            total_price,
            status,
            created_at,
        ))
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, order: &Order) -> Result<(), StoreError> {
        let query = format!("INSERT INTO orders ({COLUMNS}) VALUES ($1, $2, $3, $4, $5)");
        sqlx::query(&query)
            .bind(order.id().0)
            .bind(order.product_id())
            .bind(order.total_price())
            .bind(order.status().as_str())
            .bind(order.created_at())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn query_by_product(&self, product_id: &str) -> Result<Vec<Order>, StoreError> {
        let query =
            format!(r#"SELECT {COLUMNS} FROM orders WHERE "productId" = $1 ORDER BY "createdAt""#);
        let rows: Vec<OrderRow> = sqlx::query_as(&query)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::decode).collect()
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let query = format!(r#"SELECT {COLUMNS} FROM orders ORDER BY "createdAt""#);
        let rows: Vec<OrderRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    async fn delete_all(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(r#"DELETE FROM orders RETURNING "productId""#)
            .fetch_all(&self.pool)
            .await?;
        let products: BTreeSet<String> = rows.into_iter().map(|(id,)| id).collect();
        Ok(products.into_iter().collect())
    }
}
