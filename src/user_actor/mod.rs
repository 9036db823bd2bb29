//! # User Actor
//!
//! Registered users and their roles. The HTTP layer resolves the forwarded
//! user id against this store to decide what a caller may see.
//!
//! - **No dependencies**: `Context = ()`
//! - **Sequential ids**: `user_1`, `user_2`, ...

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use resource_actor::ResourceActor;

/// Creates a new User actor and its client.
pub fn new() -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, UserClient::new(generic_client))
}
