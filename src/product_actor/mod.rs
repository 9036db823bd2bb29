//! # Product Actor
//!
//! Vendor catalogs and inventory, with custom actions for stock:
//!
//! ```rust,ignore
//! // Read-only
//! let stock = product_client.check_stock(product_id).await?;
//!
//! // Mutating, fails with InsufficientStock
//! product_client.reserve_stock(product_id, quantity).await?;
//! product_client.release_stock(product_id, quantity).await?;
//! ```
//!
//! ## Structure
//!
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Product`]
//! - [`error`]: [`ProductError`]
//! - [`actions`]: [`ProductAction`] and [`ProductActionResult`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::ProductClient;
use crate::model::Product;
use resource_actor::ResourceActor;

/// Creates a new Product actor and its client.
pub fn new() -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(64);
    (actor, ProductClient::new(generic_client))
}
