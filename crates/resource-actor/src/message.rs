//! # Store Messages
//!
//! The request enum exchanged between [`ResourceClient`](crate::ResourceClient)
//! and [`ResourceActor`](crate::ResourceActor).

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants are the standard resource lifecycle (create, read, update,
/// delete) plus `List` for filtered scans, `Upsert` for keyed idempotent writes
/// and `Action` for resource-specific operations. Payload types come from the
/// entity's associated types, so an order payload cannot be sent to a product
/// store.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: T::Filter,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    /// Creates or replaces the entity stored under `id`. Responds `true` when
    /// an existing entity was replaced.
    Upsert {
        id: T::Id,
        params: T::Create,
        respond_to: Response<bool>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
