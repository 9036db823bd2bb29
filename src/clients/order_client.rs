//! # Order Client
//!
//! Typed access to the Order actor. Every lifecycle method sends one
//! [`OrderAction`], which the store applies atomically, and returns the
//! updated order.
use crate::model::{
    Decider, Order, OrderCreate, OrderNumber, OrderStatus, RefundRequester,
};
use crate::order_actor::{OrderAction, OrderError, ShipmentInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Client for interacting with the Order actor.
///
/// Validation (owner, vendor, products) and stock reservation happen in the
/// Order actor's `on_create` hook.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Bounds every request to the store.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    #[instrument(skip(self, params), fields(vendor = %params.vendor_id, lines = params.lines.len()))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderNumber, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(OrderError::from)
    }

    async fn act(&self, number: &OrderNumber, action: OrderAction) -> Result<Order, OrderError> {
        self.inner
            .perform_action(number.clone(), action)
            .await
            .map_err(OrderError::from)
    }

    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        number: &OrderNumber,
        reference: String,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(number, OrderAction::RecordPayment { reference, at })
            .await
    }

    #[instrument(skip(self))]
    pub async fn advance(
        &self,
        number: &OrderNumber,
        target: OrderStatus,
        shipment: Option<ShipmentInfo>,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(
            number,
            OrderAction::Advance {
                target,
                shipment,
                at,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        number: &OrderNumber,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(number, OrderAction::Cancel { reason, at }).await
    }

    #[instrument(skip(self))]
    pub async fn request_refund(
        &self,
        number: &OrderNumber,
        request_id: Uuid,
        requested_by: RefundRequester,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(
            number,
            OrderAction::RequestRefund {
                request_id,
                requested_by,
                reason,
                at,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn begin_refund_decision(
        &self,
        number: &OrderNumber,
        decider: Decider,
        at: DateTime<Utc>,
        claim_ttl: chrono::Duration,
    ) -> Result<Order, OrderError> {
        self.act(
            number,
            OrderAction::BeginRefundDecision {
                decider,
                at,
                claim_ttl,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn complete_refund(
        &self,
        number: &OrderNumber,
        request_id: Uuid,
        transaction_id: String,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(
            number,
            OrderAction::CompleteRefund {
                request_id,
                transaction_id,
                notes,
                at,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn abort_refund_decision(
        &self,
        number: &OrderNumber,
        request_id: Uuid,
    ) -> Result<Order, OrderError> {
        self.act(number, OrderAction::AbortRefundDecision { request_id })
            .await
    }

    #[instrument(skip(self))]
    pub async fn reject_refund(
        &self,
        number: &OrderNumber,
        decider: Decider,
        notes: String,
        at: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        self.act(number, OrderAction::RejectRefund { decider, notes, at })
            .await
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::from(e)
    }
}
