//! # Order Actor
//!
//! Orders, their items and their refund requests, keyed by order number.
//!
//! ## Structure
//!
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation for [`Order`]
//! - [`actions`]: [`OrderAction`], the status and refund transitions
//! - [`error`]: [`OrderError`], the error taxonomy shared with the services
//!
//! ## Dependencies
//!
//! The order actor validates new orders against the user, vendor and product
//! stores and reserves stock, so it runs with their clients as context:
//!
//! ```rust,ignore
//! let order_handle = tokio::spawn(order_actor.run((
//!     user_client.clone(),
//!     vendor_client.clone(),
//!     product_client.clone(),
//! )));
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::{OrderClient, ProductClient, UserClient, VendorClient};
use crate::model::{Order, OrderNumber};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use resource_actor::ResourceActor;

/// Upper bound on refund reasons and decision notes.
pub const MAX_REASON_LEN: usize = 1000;

/// Stores the order actor talks to while running its hooks.
pub type OrderContext = (UserClient, VendorClient, ProductClient);

/// Creates a new Order actor and its client.
///
/// Order numbers are drawn at random for the current month; the store retries
/// on collision.
pub fn new() -> (ResourceActor<Order>, OrderClient) {
    let mut rng = StdRng::from_os_rng();
    let (actor, generic_client) = ResourceActor::with_id_generator(64, move || {
        OrderNumber::generate(Utc::now(), &mut rng)
    });
    (actor, OrderClient::new(generic_client))
}
