//! # Refund and Cancellation Workflow
//!
//! Requests, decisions and cancellations. Every state change is a single
//! order action, so the store's one-message-at-a-time processing settles
//! races: of two concurrent requests only one opens a refund, and of a
//! concurrent approve and reject only the first to see `pending` wins.
//!
//! ## Approval
//!
//! ```text
//! claim (pending → approving) ──► gateway.refund(key = request id)
//!                                   │ ok            │ error / timeout
//!                                   ▼               ▼
//!                          complete (refunded)   release claim (pending)
//! ```
//!
//! The gateway is idempotent by key, so an approval retried after a timeout
//! cannot refund twice.

use crate::clients::OrderClient;
use crate::gateway::{PaymentGateway, RefundCall};
use crate::model::{Order, RefundRequester, Role, User};
use crate::notify::{NotificationDispatcher, Template};
use crate::order_actor::entity::validate_text;
use crate::order_actor::OrderError;
use crate::orders::{access, Directory, OrderManager};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Timing knobs for decisions.
#[derive(Debug, Clone, Copy)]
pub struct RefundSettings {
    /// Bound on one gateway call.
    pub gateway_timeout: Duration,
    /// After this long an `approving` claim is considered abandoned.
    pub claim_ttl: chrono::Duration,
}

impl Default for RefundSettings {
    fn default() -> Self {
        Self {
            gateway_timeout: Duration::from_secs(10),
            claim_ttl: chrono::Duration::seconds(120),
        }
    }
}

#[derive(Clone)]
pub struct RefundWorkflow {
    manager: OrderManager,
    orders: OrderClient,
    directory: Directory,
    gateway: Arc<dyn PaymentGateway>,
    notifications: NotificationDispatcher,
    settings: RefundSettings,
}

/// Optional notes: blank means none, otherwise bounded like a reason.
fn optional_notes(notes: Option<&str>) -> Result<Option<String>, OrderError> {
    match notes.map(str::trim).filter(|n| !n.is_empty()) {
        Some(notes) => validate_text("notes", notes).map(Some),
        None => Ok(None),
    }
}

impl RefundWorkflow {
    pub fn new(
        manager: OrderManager,
        orders: OrderClient,
        directory: Directory,
        gateway: Arc<dyn PaymentGateway>,
        notifications: NotificationDispatcher,
        settings: RefundSettings,
    ) -> Self {
        Self {
            manager,
            orders,
            directory,
            gateway,
            notifications,
            settings,
        }
    }

    async fn notify_customer(&self, order: &Order, template: Template, data: serde_json::Value) {
        if let Some(recipient) = self.directory.customer_email(order).await {
            self.notifications.send(recipient, template, data);
        }
    }

    async fn notify_vendor(&self, order: &Order, template: Template, data: serde_json::Value) {
        if let Some(recipient) = self.directory.vendor_email(order.vendor_id).await {
            self.notifications.send(recipient, template, data);
        }
    }

    async fn open_request(
        &self,
        order: &Order,
        requested_by: RefundRequester,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let updated = self
            .orders
            .request_refund(
                &order.number,
                uuid::Uuid::new_v4(),
                requested_by,
                reason.to_string(),
                Utc::now(),
            )
            .await?;
        info!(order = %updated.number, "Refund requested");
        self.notify_vendor(
            &updated,
            Template::RefundRequested,
            json!({
                "orderNumber": updated.number,
                "reason": updated.refund.as_ref().map(|r| r.reason.as_str()),
                "total": updated.total,
            }),
        )
        .await;
        Ok(updated)
    }

    /// Opens a refund request on a paid order the caller owns (or, for
    /// admins, any order).
    #[instrument(skip(self, user, reason), fields(user = %user.id))]
    pub async fn request_refund(
        &self,
        user: &User,
        number: &str,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let order = self.manager.load_visible(number, user).await?;
        let requested_by = if order.owned_by(user.id) {
            RefundRequester::Customer { user_id: user.id }
        } else if user.role.is_admin() {
            RefundRequester::System
        } else {
            return Err(OrderError::Forbidden(
                "only the customer may request a refund".into(),
            ));
        };
        self.open_request(&order, requested_by, reason).await
    }

    #[instrument(skip(self, email, reason))]
    pub async fn guest_request_refund(
        &self,
        email: &str,
        number: &str,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let order = self.manager.load_for_guest(email, number).await?;
        let requested_by = RefundRequester::Guest {
            email: email.trim().to_string(),
        };
        self.open_request(&order, requested_by, reason).await
    }

    /// Approves the pending request: claims it, refunds through the gateway
    /// and marks the order refunded. A gateway failure or timeout releases
    /// the claim and leaves the order in `refund_requested`.
    #[instrument(skip(self, user, notes), fields(user = %user.id))]
    pub async fn approve_refund(
        &self,
        user: &User,
        number: &str,
        notes: Option<&str>,
    ) -> Result<Order, OrderError> {
        let notes = optional_notes(notes)?;
        let order = self.manager.load(number).await?;
        let decider = access::decider_for(user, &order)?;

        let claimed = self
            .orders
            .begin_refund_decision(&order.number, decider, Utc::now(), self.settings.claim_ttl)
            .await?;
        let Some(request) = claimed.refund.as_ref() else {
            return Err(OrderError::AlreadyDecided(claimed.number.to_string()));
        };
        let request_id = request.id;

        let Some(payment_reference) = claimed.payment_reference.clone() else {
            self.release_claim(&claimed, request_id).await;
            return Err(OrderError::NotEligible(
                "the order has no captured payment to refund".into(),
            ));
        };
        let call = RefundCall {
            payment_reference,
            amount: claimed.total,
            idempotency_key: request_id.to_string(),
        };
        let limit = self.settings.gateway_timeout;
        let receipt = match tokio::time::timeout(limit, self.gateway.refund(call)).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                error!(order = %claimed.number, request = %request_id, error = %e, "Gateway refund failed");
                self.release_claim(&claimed, request_id).await;
                return Err(OrderError::GatewayError(e.to_string()));
            }
            Err(_) => {
                error!(order = %claimed.number, request = %request_id, ?limit, "Gateway refund timed out");
                self.release_claim(&claimed, request_id).await;
                return Err(OrderError::GatewayError(format!(
                    "no answer within {}ms",
                    limit.as_millis()
                )));
            }
        };

        let refunded = self
            .orders
            .complete_refund(
                &claimed.number,
                request_id,
                receipt.transaction_id.clone(),
                notes.clone(),
                Utc::now(),
            )
            .await?;
        info!(
            order = %refunded.number,
            transaction = %receipt.transaction_id,
            amount = %refunded.total,
            "Refund approved"
        );
        self.notify_customer(
            &refunded,
            Template::RefundApproved,
            json!({
                "orderNumber": refunded.number,
                "amount": refunded.total,
                "notes": notes,
            }),
        )
        .await;
        Ok(refunded)
    }

    async fn release_claim(&self, order: &Order, request_id: uuid::Uuid) {
        if let Err(e) = self
            .orders
            .abort_refund_decision(&order.number, request_id)
            .await
        {
            // The claim expires on its own after the TTL.
            warn!(order = %order.number, request = %request_id, error = %e, "Releasing approval claim failed");
        }
    }

    /// Rejects the pending request with mandatory notes and restores the
    /// status the order had before the request.
    #[instrument(skip(self, user, notes), fields(user = %user.id))]
    pub async fn reject_refund(
        &self,
        user: &User,
        number: &str,
        notes: &str,
    ) -> Result<Order, OrderError> {
        let order = self.manager.load(number).await?;
        let decider = access::decider_for(user, &order)?;
        let rejected = self
            .orders
            .reject_refund(&order.number, decider, notes.to_string(), Utc::now())
            .await?;
        info!(order = %rejected.number, status = %rejected.status, "Refund rejected");
        let notes = rejected
            .refund_history
            .last()
            .and_then(|r| r.decision_notes.clone());
        self.notify_customer(
            &rejected,
            Template::RefundRejected,
            json!({
                "orderNumber": rejected.number,
                "notes": notes,
            }),
        )
        .await;
        Ok(rejected)
    }

    async fn cancel(&self, order: &Order, reason: &str) -> Result<Order, OrderError> {
        self.orders
            .cancel(&order.number, reason.to_string(), Utc::now())
            .await
    }

    /// Cancels an unpaid order. The customer, the vendor and admins may
    /// cancel; the other side is told.
    #[instrument(skip(self, user, reason), fields(user = %user.id))]
    pub async fn cancel_order(
        &self,
        user: &User,
        number: &str,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let order = self.manager.load_visible(number, user).await?;
        let by_customer = order.owned_by(user.id);
        let cancelled = self.cancel(&order, reason).await?;
        info!(order = %cancelled.number, by_customer, "Order cancelled");

        let data = json!({
            "orderNumber": cancelled.number,
            "reason": cancelled.cancellation_reason,
        });
        if by_customer {
            self.notify_vendor(&cancelled, Template::OrderCancelled, data).await;
        } else {
            self.notify_customer(&cancelled, Template::OrderCancelled, data.clone())
                .await;
            // Admin cancellations are news to the vendor too.
            if matches!(user.role, Role::Admin) {
                self.notify_vendor(&cancelled, Template::OrderCancelled, data).await;
            }
        }
        Ok(cancelled)
    }

    #[instrument(skip(self, email, reason))]
    pub async fn guest_cancel_order(
        &self,
        email: &str,
        number: &str,
        reason: &str,
    ) -> Result<Order, OrderError> {
        let order = self.manager.load_for_guest(email, number).await?;
        let cancelled = self.cancel(&order, reason).await?;
        info!(order = %cancelled.number, "Order cancelled by guest");
        self.notify_vendor(
            &cancelled,
            Template::OrderCancelled,
            json!({
                "orderNumber": cancelled.number,
                "reason": cancelled.cancellation_reason,
            }),
        )
        .await;
        Ok(cancelled)
    }
}
