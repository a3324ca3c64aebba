//! # HTTP Surface
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/` | 200 liveness text |
//! | POST | `/orders` | 201 `Order` (queued, not yet durable) |
//! | GET | `/orders/:productId` | 200 `[Order]` |
//! | GET | `/orders` | 200 `[Order]` |
//! | DELETE | `/orders` | 204 |
//! | GET | `/products` | 200 `[ProductSnapshot]` |
//!
//! Failures are `{"error": "..."}` with the status chosen by [`ApiError`].

pub mod error;
pub mod handlers;

pub use error::ApiError;

use crate::intake::OrderService;
use axum::routing::get;
use axum::Router;

pub fn router(service: OrderService) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route(
            "/orders",
            get(handlers::list_orders)
                .post(handlers::create_order)
                .delete(handlers::delete_all_orders),
        )
        .route("/orders/:product_id", get(handlers::get_orders_by_product_id))
        .route("/products", get(handlers::list_products))
        .with_state(service)
}
