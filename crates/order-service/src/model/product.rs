/// Read-only view of a catalog product, as returned by the remote catalog.
///
/// Snapshots are cached briefly by the resolver and never persisted by this service.
/// Unknown fields in the catalog response (e.g. `createdAt`) are ignored.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// Units in stock. Signed: the catalog is not trusted to never go negative.
    pub quantity: i64,
}

impl ProductSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}
