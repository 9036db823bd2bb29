//! Lifecycle actions for the Order actor.
//!
//! Every action checks the order's current state and mutates it in the same
//! hook. Because the order store handles one message at a time, each action is
//! a conditional update: of two racing callers, the second sees the state the
//! first one left behind.

use crate::model::{Decider, OrderStatus, RefundRequester};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Carrier details required when an order ships.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentInfo {
    pub carrier: String,
    pub tracking_number: String,
}

/// Custom actions for Order entities. Each returns the updated order.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Payment capture: `pending → paid`.
    RecordPayment { reference: String, at: DateTime<Utc> },

    /// Fulfilment along the happy path (`processing`, `shipped`, `delivered`).
    Advance {
        target: OrderStatus,
        shipment: Option<ShipmentInfo>,
        at: DateTime<Utc>,
    },

    /// Cancels an unpaid `pending`/`processing` order and releases its stock.
    Cancel { reason: String, at: DateTime<Utc> },

    /// Opens a refund request on a paid order.
    RequestRefund {
        request_id: Uuid,
        requested_by: RefundRequester,
        reason: String,
        at: DateTime<Utc>,
    },

    /// Claims the pending request for approval (`pending → approving`).
    ///
    /// A claim older than `claim_ttl` is considered abandoned and may be
    /// taken over. The gateway call is keyed by the request id, so the new
    /// claimant replays it instead of refunding twice.
    BeginRefundDecision {
        decider: Decider,
        at: DateTime<Utc>,
        claim_ttl: chrono::Duration,
    },

    /// Finishes a claimed approval after the gateway refunded the payment.
    CompleteRefund {
        request_id: Uuid,
        transaction_id: String,
        notes: Option<String>,
        at: DateTime<Utc>,
    },

    /// Releases a claim after a failed gateway call. No-op if the claim is
    /// no longer held.
    AbortRefundDecision { request_id: Uuid },

    /// Rejects the pending request and restores the prior status. Any
    /// approval claim blocks a rejection, expired or not.
    RejectRefund {
        decider: Decider,
        notes: String,
        at: DateTime<Utc>,
    },
}
