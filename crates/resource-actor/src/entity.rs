//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every stored resource (order, product,
//! user, cart, ...) implements so it can be owned by a generic [`ResourceActor`].
//! It names the id, DTO, action, filter, context and error types of the
//! resource and provides the lifecycle hooks the actor calls.
//!
//! Hooks that mutate (`on_update`, `handle_action`) are invoked on a *draft*
//! copy of the stored entity. The draft is committed only when the hook returns
//! `Ok`, so a hook may bail out half-way through without leaving a partially
//! applied change behind.
//!
//! [`ResourceActor`]: crate::ResourceActor

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by `ResourceActor`.
///
/// # Async & Context
/// The trait is `#[async_trait]` so hooks may await other stores. The `Context`
/// type is injected into every hook when the actor is started, which lets
/// dependencies be bound late (passed to `run()` rather than `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Resource-specific operations (e.g. `ReserveStock`, `RequestRefund`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Criteria accepted by `list`. Use `()` when the store is only ever
    /// listed in full.
    type Filter: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum covers every operation of the resource. Clients recover it
    /// from [`FrameworkError::EntityError`](crate::FrameworkError::EntityError)
    /// by downcasting.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the id and payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// An id chosen by the caller (imports, natural keys). When `None` the
    /// actor allocates one from its generator.
    fn requested_id(_params: &Self::Create) -> Option<Self::Id> {
        None
    }

    /// Whether this entity is part of a `list` result for `filter`.
    fn matches(&self, _filter: &Self::Filter) -> bool {
        true
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    /// Returning an error aborts the create.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called with a draft copy when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the entity is removed from the store.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a resource-specific action on a draft copy.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
