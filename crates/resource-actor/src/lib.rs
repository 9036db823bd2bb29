//! # Resource Actor
//!
//! Typed, in-process resource stores built on the actor model. Each entity type
//! is owned by a single Tokio task ([`ResourceActor`]) that processes requests
//! one at a time; callers talk to it through a cloneable [`ResourceClient`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the resource's data, DTOs and business hooks.
//! 2. **Runtime** ([`ResourceActor`]): the message loop and the store.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed requests.
//!
//! ## Consistency
//!
//! - Mutating hooks run on a draft copy that is committed only on success, so
//!   an entity is never left half-updated.
//! - Requests to one store are serialized. A hook that checks the current
//!   state before changing it is therefore a compare-and-swap: of two racing
//!   callers, the second observes the first one's result.
//! - Clients can bound every request with [`ResourceClient::with_timeout`].
//!
//! ## Context Injection
//!
//! Dependencies are passed to [`ResourceActor::run`] rather than to the
//! constructor, so stores that depend on each other can be created first and
//! wired afterwards:
//!
//! ```rust,ignore
//! let (product_actor, products) = ResourceActor::<Product>::new(32);
//! let (order_actor, orders) = ResourceActor::<Order>::with_id_generator(32, next_order_number);
//! tokio::spawn(product_actor.run(()));
//! tokio::spawn(order_actor.run(products.clone()));
//! ```
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers requests from scripted expectations so callers
//! can be tested without spawning the stores they depend on.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::{ResourceActor, MAX_ID_ATTEMPTS};
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
