//! # Order Service
//!
//! Order intake for an e-commerce catalog, built on [`order_pipeline`].
//!
//! ## Core Components
//!
//! - **[model]**: [`Order`](model::Order) and [`ProductSnapshot`](model::ProductSnapshot).
//! - **[intake]**: [`OrderService`](intake::OrderService), the caller-facing API, and the
//!   [`OrderJob`](intake::OrderJob) workers run for every admitted order.
//! - **[catalog]**: remote product lookups behind a cache-first
//!   [`ProductResolver`](catalog::ProductResolver).
//! - **[cache]** / **[store]** / **[events]**: contracts and adapters for Redis, Postgres
//!   and the broker, each with an in-memory double.
//! - **[lifecycle]**: [`OrderSystem`](lifecycle::OrderSystem) starts and stops the pipeline.
//! - **[config]** / **[http]**: environment settings and the axum router.
//!
//! ## Order Flow
//!
//! ```text
//! POST /orders ─▶ OrderService::create_order
//!                   │ resolve product (cache ▸ catalog)
//!                   │ stock check, build Order
//!                   │ DEL orders:product:{id}
//!                   │ try_submit ──full──▶ 429 Overloaded
//!                   ▼
//!               201 Order (not yet durable)
//!
//! worker ◀─ queue: persist (≤3 attempts, 1u/2u backoff)
//!                  DEL orders:product:{id}
//!                  publish events/order.created (best effort)
//! ```
//!
//! ## Testing
//!
//! Every external collaborator has an in-memory implementation (`MemoryCache`,
//! `MemoryOrderStore`, `StaticCatalog`, `MemoryBroker`), and retry timing is observed with
//! [`order_pipeline::mock::RecordingSleeper`].

pub mod cache;
pub mod catalog;
pub mod config;
pub mod events;
pub mod http;
pub mod intake;
pub mod lifecycle;
pub mod model;
pub mod store;
