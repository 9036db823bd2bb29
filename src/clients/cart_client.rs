use crate::cart_actor::{CartAction, CartError};
use crate::model::{Cart, CartCreate, CartId, CartUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for interacting with the Cart actor.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }

    /// Bounds every request to the store.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_cart(&self, params: CartCreate) -> Result<CartId, CartError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(CartError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_cart(&self, id: CartId, update: CartUpdate) -> Result<Cart, CartError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(CartError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_out(&self, id: CartId, at: DateTime<Utc>) -> Result<(), CartError> {
        self.inner
            .perform_action(id, CartAction::CheckOut { at })
            .await
            .map_err(CartError::from)
    }

    /// Records a reminder if the cart is still abandoned as of `cutoff`.
    #[instrument(skip(self))]
    pub async fn mark_reminded(
        &self,
        id: CartId,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<(), CartError> {
        self.inner
            .perform_action(id, CartAction::MarkReminded { cutoff, at })
            .await
            .map_err(CartError::from)
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        CartError::from(e)
    }
}
