use crate::model::{OrderStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A refund or cancellation request attached to an order.
///
/// An order holds at most one active request; resolved requests move to the
/// order's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// Also the idempotency key sent to the payment gateway.
    pub id: Uuid,
    pub requested_by: RefundRequester,
    pub reason: String,
    pub status: RefundStatus,
    /// Order status at the time of the request; restored on rejection.
    pub previous_status: OrderStatus,
    pub requested_at: DateTime<Utc>,
    /// Start of the current approval claim, while `status` is `approving`.
    pub claimed_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Decider>,
    pub decision_notes: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
}

impl RefundRequest {
    /// Whether an approval claim is still in flight at `now`.
    pub fn claim_is_live(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        self.status == RefundStatus::Approving
            && self.claimed_at.is_some_and(|claimed| claimed + ttl > now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    /// Claimed by an approval that is talking to the payment gateway.
    Approving,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RefundRequester {
    Customer { user_id: UserId },
    Guest { email: String },
    /// Platform staff or an automated process.
    System,
}

/// Who decided a request, and in which capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decider {
    pub user_id: UserId,
    pub role: DeciderRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeciderRole {
    Vendor,
    Admin,
}
