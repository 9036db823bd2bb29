//! # ActorClient Trait
//!
//! Common surface for resource-specific clients: default `get`, `list` and
//! `delete` built on the wrapped [`ResourceClient`], with store errors mapped
//! into the resource's own error type.

use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard read/delete operations.
///
/// # Example
///
/// ```rust
/// use resource_actor::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Vendor { id: u32 }
/// #[derive(Debug)] struct VendorCreate;
/// #[derive(Debug, thiserror::Error)] #[error("vendor error: {0}")] struct VendorError(String);
///
/// #[async_trait]
/// impl ActorEntity for Vendor {
///     type Id = u32; type Create = VendorCreate; type Update = ();
///     type Action = (); type ActionResult = (); type Filter = ();
///     type Context = (); type Error = VendorError;
///     fn from_create_params(id: u32, _: VendorCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct VendorClient { inner: ResourceClient<Vendor> }
///
/// #[async_trait]
/// impl ActorClient<Vendor> for VendorClient {
///     type Error = VendorError;
///     fn inner(&self) -> &ResourceClient<Vendor> { &self.inner }
///     fn map_error(e: FrameworkError) -> Self::Error { VendorError(e.to_string()) }
/// }
///
/// async fn usage(client: VendorClient) {
///     // get(), list() and delete() are provided.
///     let _ = client.get(1).await;
///     let _ = client.list(()).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic `ResourceClient`.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map store errors to the resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity matching `filter`.
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: T::Filter) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list(filter).await.map_err(Self::map_error)
    }

    /// Delete an entity by id.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
