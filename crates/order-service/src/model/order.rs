/// Represents a customer order.
///
/// An `Order` is frozen once constructed: fields are private and there are no setters.
/// The intake controller builds it, the admission queue and the store only move it around.
///
/// Wire shape (also the cached and published form):
///
/// ```json
/// {"id":"…","productId":"p1","totalPrice":25.5,"status":"PENDING","createdAt":"2026-…Z"}
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// A fresh random (v4) id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle state. Only `Pending` is reachable in this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    product_id: String,
    total_price: f64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order with a fresh id.
    ///
    /// # Arguments
    /// * `product_id` - Product being ordered
    /// * `unit_price` - Price from the resolved product snapshot
    /// * `quantity` - Units ordered
    ///
    /// `total_price` is computed here once and never recomputed.
    pub fn new(product_id: impl Into<String>, unit_price: f64, quantity: u32) -> Self {
        Self {
            id: OrderId::generate(),
            product_id: product_id.into(),
            total_price: unit_price * f64::from(quantity),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Rebuilds an order read back from durable storage.
    pub fn from_parts(
        id: OrderId,
        product_id: String,
        total_price: f64,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product_id,
            total_price,
            status,
            created_at,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
