use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use order_pipeline::RetryPolicy;
use order_service::cache::MemoryCache;
use order_service::catalog::StaticCatalog;
use order_service::events::MemoryBroker;
use order_service::lifecycle::{Dependencies, OrderSystem, PipelineSettings};
use order_service::model::{Order, ProductSnapshot};
use order_service::store::{MemoryOrderStore, OrderStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn system(store: &MemoryOrderStore, queue_capacity: usize, workers: usize) -> OrderSystem {
    let catalog = StaticCatalog::new()
        .with_product(ProductSnapshot::new("p1", "Widget", 10.0, 5))
        .with_product(ProductSnapshot::new("gone", "Sold out", 10.0, 0));
    let deps = Dependencies::new(
        Arc::new(store.clone()),
        Arc::new(MemoryCache::new()),
        Arc::new(catalog),
        Arc::new(MemoryBroker::new()),
    );
    OrderSystem::start(
        deps,
        PipelineSettings {
            queue_capacity,
            workers,
            retry: RetryPolicy::linear(3, Duration::from_millis(1)),
            ..PipelineSettings::default()
        },
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

fn post_order(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_is_alive() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, _) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_post_order_returns_created_order() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, body) = send(&app, post_order(json!({"productId": "p1", "quantity": 3}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["productId"], "p1");
    assert_eq!(body["totalPrice"], 30.0);
    assert_eq!(body["status"], "PENDING");
}

#[tokio::test]
async fn test_quantity_defaults_to_one() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, body) = send(&app, post_order(json!({"productId": "p1"}))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalPrice"], 10.0);
}

#[tokio::test]
async fn test_error_statuses() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 1, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, body) = send(&app, post_order(json!({"productId": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, post_order(json!({"productId": "p404"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, post_order(json!({"productId": "gone"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Capacity 1, no workers: the second admission is shed.
    let (status, _) = send(&app, post_order(json!({"productId": "p1"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, post_order(json!({"productId": "p1"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().contains("overloaded"));
}

#[tokio::test]
async fn test_unreadable_bodies_are_bad_request_with_error_body() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    for body in [
        json!({"quantity": 1}),
        json!({"productId": "p1", "quantity": -1}),
        json!("garbage"),
    ] {
        let (status, response) = send(&app, post_order(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert!(response["error"].is_string(), "body {body}");
    }

    let not_json = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, response) = send(&app, not_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].is_string());
    assert_eq!(system.service.queue_depth(), 0);
}

#[tokio::test]
async fn test_path_like_product_id_is_bad_request() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, _) = send(&app, post_order(json!({"productId": "p1/../gone"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shutting_down_is_service_unavailable() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 1);
    let app = order_service::http::router(system.service.clone());
    system.shutdown().await.unwrap();

    let (status, _) = send(&app, post_order(json!({"productId": "p1"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_order_queries_and_delete() {
    let store = MemoryOrderStore::new();
    let existing = Order::new("p1", 10.0, 1);
    store.create(&existing).await.unwrap();
    store.create(&Order::new("p2", 1.0, 1)).await.unwrap();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, body) = send(&app, get("/orders/p1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], existing.id().to_string());

    let (status, body) = send(&app, get("/orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let delete = Request::builder()
        .method("DELETE")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.orders().is_empty());

    let (_, body) = send(&app, get("/orders/p1")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let store = MemoryOrderStore::new();
    store.set_reads_unavailable(true);
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, _) = send(&app, get("/orders")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_products() {
    let store = MemoryOrderStore::new();
    let system = system(&store, 10, 0);
    let app = order_service::http::router(system.service.clone());

    let (status, body) = send(&app, get("/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}
