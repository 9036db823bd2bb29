//! Type-safe wrappers around [`ResourceClient`](resource_actor::ResourceClient).
//!
//! Each client implements [`ActorClient`](resource_actor::ActorClient) for
//! `get`/`list`/`delete` and adds the resource's own operations, returning the
//! resource's error type.

pub mod cart_client;
pub mod order_client;
pub mod product_client;
pub mod report_client;
pub mod user_client;
pub mod vendor_client;

pub use cart_client::*;
pub use order_client::*;
pub use product_client::*;
pub use report_client::*;
pub use user_client::*;
pub use vendor_client::*;
