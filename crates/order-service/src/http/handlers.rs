//! Request handlers. Each one parses its input, calls [`OrderService`], and maps the
//! result; no business logic lives here.

use super::error::ApiError;
use crate::intake::{OrderError, OrderService};
use crate::model::{Order, ProductSnapshot};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

/// `POST /orders` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

pub async fn root() -> &'static str {
    "Order service is running"
}

/// An unreadable body (not JSON, missing `productId`, negative `quantity`) is a 400 with
/// the usual error body, not axum's plain-text rejection.
pub async fn create_order(
    State(service): State<OrderService>,
    request: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(request) =
        request.map_err(|rejection| OrderError::Validation(rejection.body_text()))?;
    let order = service
        .create_order(&request.product_id, request.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_orders_by_product_id(
    State(service): State<OrderService>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(service.get_orders_by_product_id(&product_id).await?))
}

pub async fn list_orders(
    State(service): State<OrderService>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(service.list_orders().await?))
}

pub async fn delete_all_orders(
    State(service): State<OrderService>,
) -> Result<StatusCode, ApiError> {
    service.delete_all_orders().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_products(
    State(service): State<OrderService>,
) -> Result<Json<Vec<ProductSnapshot>>, ApiError> {
    Ok(Json(service.list_products().await?))
}
