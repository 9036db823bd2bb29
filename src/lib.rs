//! # Marketplace Orders
//!
//! Order lifecycle, refunds and scheduled jobs for a multi-vendor
//! marketplace, served over a JSON HTTP API.
//!
//! ## Layers
//!
//! - **Stores** ([`user_actor`], [`vendor_actor`], [`product_actor`],
//!   [`order_actor`], [`cart_actor`], [`report_actor`]): one
//!   [`ResourceActor`](resource_actor::ResourceActor) per entity. Each
//!   processes its messages sequentially, so a check-then-write inside an
//!   action is atomic. Order status changes and refund claims rely on this.
//! - **Clients** ([`clients`]): typed wrappers over the store channels.
//! - **Services** ([`orders`], [`refunds`], [`jobs`]): access rules,
//!   workflows and notifications on top of the stores.
//! - **Edges** ([`gateway`], [`notify`]): the payment gateway and the
//!   notification provider, both behind traits.
//! - **Interface** ([`http`]): axum routes, envelopes and error mapping.
//! - **Runtime** ([`config`], [`lifecycle`]): environment configuration,
//!   actor startup and shutdown.
//!
//! ## Running
//!
//! ```bash
//! MARKETPLACE_SEED_DEMO=true RUST_LOG=info cargo run
//! curl -H 'x-user-id: 3' localhost:8080/api/orders/LM-2401-AB12   # the demo customer
//! ```

pub mod cart_actor;
pub mod clients;
pub mod config;
pub mod gateway;
pub mod http;
pub mod jobs;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod orders;
pub mod product_actor;
pub mod refunds;
pub mod report_actor;
pub mod user_actor;
pub mod vendor_actor;
