//! [`ActorEntity`] implementation for [`Order`].
//!
//! `on_create` enforces referential integrity (owner, vendor and products must
//! exist and the products must belong to the vendor), captures catalog prices
//! and reserves stock. The actions implement the status machine and the
//! refund request lifecycle.

use super::actions::{OrderAction, ShipmentInfo};
use super::error::OrderError;
use super::{OrderContext, MAX_REASON_LEN};
use crate::model::{
    Decider, Order, OrderCreate, OrderFilter, OrderItem, OrderLine, OrderNumber, OrderOwner,
    OrderStatus, PaymentStatus, RefundRequest, RefundRequester, RefundStatus, Shipment,
};
use crate::user_actor::looks_like_email;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_actor::{ActorClient, ActorEntity};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

/// Checks a free-text reason or note: required, bounded.
pub(crate) fn validate_text(field: &str, value: &str) -> Result<String, OrderError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(OrderError::ValidationError(format!("{field} is required")));
    }
    if value.chars().count() > MAX_REASON_LEN {
        return Err(OrderError::ValidationError(format!(
            "{field} must be at most {MAX_REASON_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

/// Folds repeated products into one line each, keeping first-seen order.
fn merge_lines(lines: Vec<OrderLine>) -> Vec<OrderLine> {
    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

impl Order {
    fn transition(&mut self, to: OrderStatus, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = at;
        Ok(())
    }

    /// The error for a decision on an order without an active request.
    fn no_active_request(&self) -> OrderError {
        if self.refund_history.is_empty() {
            OrderError::NotEligible(format!("order {} has no refund request", self.number))
        } else {
            OrderError::AlreadyDecided(self.number.to_string())
        }
    }

    fn archive_refund(&mut self) {
        if let Some(request) = self.refund.take() {
            self.refund_history.push(request);
        }
    }

    fn record_payment(&mut self, reference: String, at: DateTime<Utc>) -> Result<(), OrderError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(OrderError::ValidationError(
                "payment reference is required".into(),
            ));
        }
        if self.payment_status != PaymentStatus::Pending {
            return Err(OrderError::NotEligible(format!(
                "payment is already {}",
                self.payment_status
            )));
        }
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::NotEligible("order is cancelled".into()));
        }
        self.payment_status = PaymentStatus::Paid;
        self.payment_reference = Some(reference.to_string());
        self.updated_at = at;
        Ok(())
    }

    fn advance(
        &mut self,
        target: OrderStatus,
        shipment: Option<ShipmentInfo>,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if !matches!(
            target,
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        ) {
            return Err(OrderError::ValidationError(format!(
                "{target} is reached through the cancellation or refund workflow"
            )));
        }
        // Leaving refund_requested is reserved to the refund decision.
        if self.status == OrderStatus::RefundRequested {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        let shipment = match target {
            OrderStatus::Shipped => {
                let info = shipment.ok_or_else(|| {
                    OrderError::ValidationError("carrier and tracking number are required".into())
                })?;
                let carrier = info.carrier.trim();
                let tracking_number = info.tracking_number.trim();
                if carrier.is_empty() || tracking_number.is_empty() {
                    return Err(OrderError::ValidationError(
                        "carrier and tracking number are required".into(),
                    ));
                }
                Some(Shipment {
                    carrier: carrier.to_string(),
                    tracking_number: tracking_number.to_string(),
                    shipped_at: at,
                    delivered_at: None,
                })
            }
            _ => None,
        };
        self.transition(target, at)?;
        if let Some(shipment) = shipment {
            self.shipment = Some(shipment);
        }
        if target == OrderStatus::Delivered {
            if let Some(shipment) = self.shipment.as_mut() {
                shipment.delivered_at = Some(at);
            }
        }
        Ok(())
    }

    async fn cancel(
        &mut self,
        reason: String,
        at: DateTime<Utc>,
        ctx: &OrderContext,
    ) -> Result<(), OrderError> {
        let reason = validate_text("reason", &reason)?;
        if !matches!(self.status, OrderStatus::Pending | OrderStatus::Processing) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }
        if self.payment_status == PaymentStatus::Paid {
            return Err(OrderError::NotEligible(
                "paid orders must go through a refund request".into(),
            ));
        }
        self.transition(OrderStatus::Cancelled, at)?;
        self.cancellation_reason = Some(reason);

        let (_, _, products) = ctx;
        for item in &self.items {
            if let Err(e) = products.release_stock(item.product_id, item.quantity).await {
                warn!(order = %self.number, product = %item.product_id, error = %e, "Stock release failed");
            }
        }
        Ok(())
    }

    fn request_refund(
        &mut self,
        request_id: Uuid,
        requested_by: RefundRequester,
        reason: String,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let reason = validate_text("reason", &reason)?;
        if self.refund.is_some() {
            return Err(OrderError::AlreadyRequested(self.number.to_string()));
        }
        if !self.status.accepts_refund_request() {
            return Err(OrderError::NotEligible(format!("order is {}", self.status)));
        }
        if self.payment_status != PaymentStatus::Paid {
            return Err(OrderError::NotEligible(format!(
                "payment is {}",
                self.payment_status
            )));
        }
        let previous_status = self.status;
        self.transition(OrderStatus::RefundRequested, at)?;
        self.refund = Some(RefundRequest {
            id: request_id,
            requested_by,
            reason,
            status: RefundStatus::Pending,
            previous_status,
            requested_at: at,
            claimed_at: None,
            decided_by: None,
            decision_notes: None,
            decided_at: None,
            transaction_id: None,
        });
        Ok(())
    }

    /// Returns the active request if it may be decided at `at`.
    ///
    /// Only an approval may take over an expired claim (`claim_ttl` is
    /// `Some`): the abandoned gateway call may have gone through, and a
    /// rejection would leave that refund unrecorded.
    fn decidable_request(
        &mut self,
        at: DateTime<Utc>,
        claim_ttl: Option<chrono::Duration>,
    ) -> Result<&mut RefundRequest, OrderError> {
        let number = self.number.to_string();
        let missing = self.no_active_request();
        let request = self.refund.as_mut().ok_or(missing)?;
        match (request.status, claim_ttl) {
            (RefundStatus::Pending, _) => Ok(request),
            (RefundStatus::Approving, Some(ttl)) if !request.claim_is_live(at, ttl) => {
                warn!(order = %number, request = %request.id, "Taking over expired approval claim");
                Ok(request)
            }
            _ => Err(OrderError::AlreadyDecided(number)),
        }
    }

    fn begin_refund_decision(
        &mut self,
        decider: Decider,
        at: DateTime<Utc>,
        claim_ttl: chrono::Duration,
    ) -> Result<(), OrderError> {
        let request = self.decidable_request(at, Some(claim_ttl))?;
        request.status = RefundStatus::Approving;
        request.claimed_at = Some(at);
        request.decided_by = Some(decider);
        self.updated_at = at;
        Ok(())
    }

    fn complete_refund(
        &mut self,
        request_id: Uuid,
        transaction_id: String,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let held = self
            .refund
            .as_ref()
            .is_some_and(|r| r.id == request_id && r.status == RefundStatus::Approving);
        if !held {
            return Err(OrderError::AlreadyDecided(self.number.to_string()));
        }
        self.transition(OrderStatus::Refunded, at)?;
        self.payment_status = PaymentStatus::Refunded;
        if let Some(request) = self.refund.as_mut() {
            request.status = RefundStatus::Approved;
            request.claimed_at = None;
            request.decided_at = Some(at);
            request.decision_notes = notes;
            request.transaction_id = Some(transaction_id);
        }
        self.archive_refund();
        Ok(())
    }

    fn abort_refund_decision(&mut self, request_id: Uuid) {
        if let Some(request) = self.refund.as_mut() {
            if request.id == request_id && request.status == RefundStatus::Approving {
                request.status = RefundStatus::Pending;
                request.claimed_at = None;
                request.decided_by = None;
            }
        }
    }

    fn reject_refund(
        &mut self,
        decider: Decider,
        notes: String,
        at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let notes = validate_text("notes", &notes)?;
        let request = self.decidable_request(at, None)?;
        request.status = RefundStatus::Rejected;
        request.claimed_at = None;
        request.decided_by = Some(decider);
        request.decision_notes = Some(notes);
        request.decided_at = Some(at);
        let previous = request.previous_status;
        self.transition(previous, at)?;
        self.archive_refund();
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderNumber;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Filter = OrderFilter;
    type Context = OrderContext;
    type Error = OrderError;

    /// Builds the order skeleton. Names and prices are filled in by
    /// `on_create` from the catalog.
    fn from_create_params(number: OrderNumber, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.lines.is_empty() {
            return Err(OrderError::ValidationError(
                "an order needs at least one item".into(),
            ));
        }
        if let Some(line) = params.lines.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity for {} must be at least 1",
                line.product_id
            )));
        }
        if let OrderOwner::Guest { email, name } = &params.owner {
            if !looks_like_email(email) {
                return Err(OrderError::ValidationError(format!(
                    "invalid guest email: {email}"
                )));
            }
            if name.trim().is_empty() {
                return Err(OrderError::ValidationError("guest name is required".into()));
            }
        }
        if !matches!(
            params.payment_status,
            PaymentStatus::Pending | PaymentStatus::Paid
        ) {
            return Err(OrderError::ValidationError(format!(
                "an order cannot be placed with payment {}",
                params.payment_status
            )));
        }

        let items = merge_lines(params.lines)
            .into_iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                product_name: String::new(),
                quantity: line.quantity,
                unit_price: Decimal::ZERO,
                line_total: Decimal::ZERO,
            })
            .collect();

        Ok(Self {
            number,
            owner: params.owner,
            vendor_id: params.vendor_id,
            items,
            total: Decimal::ZERO,
            status: OrderStatus::Pending,
            payment_status: params.payment_status,
            payment_reference: params.payment_reference,
            shipment: None,
            refund: None,
            refund_history: Vec::new(),
            cancellation_reason: None,
            created_at: params.placed_at,
            updated_at: params.placed_at,
        })
    }

    fn requested_id(params: &OrderCreate) -> Option<OrderNumber> {
        params.number.clone()
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.matches(self)
    }

    /// Validates references, captures prices and reserves stock.
    ///
    /// If any reservation fails, the ones already made are released before
    /// the error is returned.
    async fn on_create(&mut self, ctx: &OrderContext) -> Result<(), Self::Error> {
        let (users, vendors, products) = ctx;

        if let OrderOwner::Registered { user_id } = &self.owner {
            users
                .get(*user_id)
                .await
                .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
                .ok_or_else(|| OrderError::ValidationError(format!("unknown customer {user_id}")))?;
        }

        vendors
            .get(self.vendor_id)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| {
                OrderError::ValidationError(format!("unknown vendor {}", self.vendor_id))
            })?;

        for item in &mut self.items {
            let product = products
                .get(item.product_id)
                .await
                .map_err(|e| OrderError::from_product(item.product_id, e))?
                .ok_or_else(|| {
                    OrderError::ValidationError(format!("unknown product {}", item.product_id))
                })?;
            if product.vendor_id != self.vendor_id {
                return Err(OrderError::ValidationError(format!(
                    "{} does not belong to {}",
                    product.id, self.vendor_id
                )));
            }
            item.product_name = product.name;
            item.unit_price = product.price;
            item.line_total = product.price * Decimal::from(item.quantity);
        }
        self.total = self.items.iter().map(|item| item.line_total).sum();

        let mut reserved = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if let Err(e) = products.reserve_stock(item.product_id, item.quantity).await {
                for (product_id, quantity) in reserved {
                    if let Err(release) = products.release_stock(product_id, quantity).await {
                        warn!(order = %self.number, product = %product_id, error = %release, "Compensating release failed");
                    }
                }
                return Err(OrderError::from_product(item.product_id, e));
            }
            reserved.push((item.product_id, item.quantity));
        }

        info!(order = %self.number, total = %self.total, items = self.items.len(), "Order placed");
        Ok(())
    }

    async fn on_update(&mut self, _update: (), _ctx: &OrderContext) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_delete(&self, _ctx: &OrderContext) -> Result<(), Self::Error> {
        Err(OrderError::NotEligible("orders are never deleted".into()))
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderContext,
    ) -> Result<Order, Self::Error> {
        match action {
            OrderAction::RecordPayment { reference, at } => self.record_payment(reference, at)?,
            OrderAction::Advance {
                target,
                shipment,
                at,
            } => self.advance(target, shipment, at)?,
            OrderAction::Cancel { reason, at } => self.cancel(reason, at, ctx).await?,
            OrderAction::RequestRefund {
                request_id,
                requested_by,
                reason,
                at,
            } => self.request_refund(request_id, requested_by, reason, at)?,
            OrderAction::BeginRefundDecision {
                decider,
                at,
                claim_ttl,
            } => self.begin_refund_decision(decider, at, claim_ttl)?,
            OrderAction::CompleteRefund {
                request_id,
                transaction_id,
                notes,
                at,
            } => self.complete_refund(request_id, transaction_id, notes, at)?,
            OrderAction::AbortRefundDecision { request_id } => {
                self.abort_refund_decision(request_id)
            }
            OrderAction::RejectRefund { decider, notes, at } => {
                self.reject_refund(decider, notes, at)?
            }
        }
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeciderRole, UserId, VendorId};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap()
    }

    fn paid_order(status: OrderStatus) -> Order {
        let mut order = Order::from_create_params(
            OrderNumber::parse("LM-2401-AB12").unwrap(),
            OrderCreate {
                number: None,
                owner: OrderOwner::Registered {
                    user_id: UserId(1),
                },
                vendor_id: VendorId(1),
                lines: vec![OrderLine {
                    product_id: crate::model::ProductId(1),
                    quantity: 2,
                }],
                payment_status: PaymentStatus::Paid,
                payment_reference: Some("pay_1".into()),
                placed_at: at(8),
            },
        )
        .unwrap();
        order.status = status;
        order
    }

    fn vendor_decider() -> Decider {
        Decider {
            user_id: UserId(2),
            role: DeciderRole::Vendor,
        }
    }

    #[test]
    fn create_rejects_empty_and_zero_quantity_lines() {
        let mut params = OrderCreate {
            number: None,
            owner: OrderOwner::Guest {
                email: "guest@example.com".into(),
                name: "Guest".into(),
            },
            vendor_id: VendorId(1),
            lines: vec![],
            payment_status: PaymentStatus::Pending,
            payment_reference: None,
            placed_at: at(8),
        };
        let number = OrderNumber::parse("LM-2401-AB12").unwrap();
        assert!(matches!(
            Order::from_create_params(number.clone(), params.clone()),
            Err(OrderError::ValidationError(_))
        ));
        params.lines = vec![OrderLine {
            product_id: crate::model::ProductId(1),
            quantity: 0,
        }];
        assert!(matches!(
            Order::from_create_params(number, params),
            Err(OrderError::ValidationError(_))
        ));
    }

    #[test]
    fn duplicate_lines_are_merged() {
        let lines = vec![
            OrderLine {
                product_id: crate::model::ProductId(1),
                quantity: 1,
            },
            OrderLine {
                product_id: crate::model::ProductId(2),
                quantity: 1,
            },
            OrderLine {
                product_id: crate::model::ProductId(1),
                quantity: 2,
            },
        ];
        let merged = merge_lines(lines);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].quantity, 3);
    }

    #[test]
    fn refund_request_records_prior_status_and_blocks_a_second() {
        let mut order = paid_order(OrderStatus::Shipped);
        order
            .request_refund(Uuid::new_v4(), RefundRequester::System, "damaged".into(), at(9))
            .unwrap();
        assert_eq!(order.status, OrderStatus::RefundRequested);
        assert_eq!(
            order.refund.as_ref().unwrap().previous_status,
            OrderStatus::Shipped
        );

        let second =
            order.request_refund(Uuid::new_v4(), RefundRequester::System, "again".into(), at(9));
        assert_eq!(
            second,
            Err(OrderError::AlreadyRequested("LM-2401-AB12".into()))
        );
    }

    #[test]
    fn delivered_and_unpaid_orders_are_not_eligible() {
        let mut delivered = paid_order(OrderStatus::Delivered);
        assert!(matches!(
            delivered.request_refund(Uuid::new_v4(), RefundRequester::System, "late".into(), at(9)),
            Err(OrderError::NotEligible(_))
        ));
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let mut unpaid = paid_order(OrderStatus::Pending);
        unpaid.payment_status = PaymentStatus::Pending;
        assert!(matches!(
            unpaid.request_refund(Uuid::new_v4(), RefundRequester::System, "changed mind".into(), at(9)),
            Err(OrderError::NotEligible(_))
        ));
    }

    #[test]
    fn reject_restores_prior_status_and_archives() {
        let mut order = paid_order(OrderStatus::Processing);
        order
            .request_refund(Uuid::new_v4(), RefundRequester::System, "damaged".into(), at(9))
            .unwrap();
        order
            .reject_refund(vendor_decider(), "no damage visible".into(), at(10))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.refund.is_none());
        assert_eq!(order.refund_history[0].status, RefundStatus::Rejected);

        assert_eq!(
            order.reject_refund(vendor_decider(), "again".into(), at(11)),
            Err(OrderError::AlreadyDecided("LM-2401-AB12".into()))
        );
    }

    #[test]
    fn live_claim_blocks_other_decisions_until_it_expires() {
        let mut order = paid_order(OrderStatus::Processing);
        order
            .request_refund(Uuid::new_v4(), RefundRequester::System, "damaged".into(), at(9))
            .unwrap();
        let ttl = chrono::Duration::seconds(120);
        order.begin_refund_decision(vendor_decider(), at(10), ttl).unwrap();

        assert!(matches!(
            order.reject_refund(vendor_decider(), "no".into(), at(10)),
            Err(OrderError::AlreadyDecided(_))
        ));
        // An hour later the claim is abandoned.
        order.begin_refund_decision(vendor_decider(), at(11), ttl).unwrap();
        assert_eq!(order.refund.as_ref().unwrap().claimed_at, Some(at(11)));
    }

    #[test]
    fn expired_claim_still_blocks_a_rejection() {
        let mut order = paid_order(OrderStatus::Processing);
        order
            .request_refund(Uuid::new_v4(), RefundRequester::System, "damaged".into(), at(9))
            .unwrap();
        order
            .begin_refund_decision(vendor_decider(), at(10), chrono::Duration::seconds(120))
            .unwrap();

        // The abandoned approval may have refunded the payment already.
        assert_eq!(
            order.reject_refund(vendor_decider(), "no".into(), at(14)),
            Err(OrderError::AlreadyDecided("LM-2401-AB12".into()))
        );
        assert_eq!(order.status, OrderStatus::RefundRequested);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.refund.as_ref().unwrap().status, RefundStatus::Approving);
    }

    #[test]
    fn abort_releases_only_the_matching_claim() {
        let mut order = paid_order(OrderStatus::Processing);
        let request_id = Uuid::new_v4();
        order
            .request_refund(request_id, RefundRequester::System, "damaged".into(), at(9))
            .unwrap();
        order
            .begin_refund_decision(vendor_decider(), at(10), chrono::Duration::seconds(120))
            .unwrap();

        order.abort_refund_decision(Uuid::new_v4());
        assert_eq!(order.refund.as_ref().unwrap().status, RefundStatus::Approving);
        order.abort_refund_decision(request_id);
        assert_eq!(order.refund.as_ref().unwrap().status, RefundStatus::Pending);
        assert_eq!(order.status, OrderStatus::RefundRequested);
    }

    #[test]
    fn shipping_requires_tracking_details() {
        let mut order = paid_order(OrderStatus::Processing);
        assert!(matches!(
            order.advance(OrderStatus::Shipped, None, at(9)),
            Err(OrderError::ValidationError(_))
        ));
        order
            .advance(
                OrderStatus::Shipped,
                Some(ShipmentInfo {
                    carrier: "DHL".into(),
                    tracking_number: "JD0001".into(),
                }),
                at(9),
            )
            .unwrap();
        order.advance(OrderStatus::Delivered, None, at(12)).unwrap();
        let shipment = order.shipment.unwrap();
        assert_eq!(shipment.delivered_at, Some(at(12)));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn skipping_states_is_an_invalid_transition() {
        let mut order = paid_order(OrderStatus::Pending);
        assert_eq!(
            order.advance(OrderStatus::Delivered, None, at(9)),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            })
        );
    }
}
