//! # Order Lifecycle Manager
//!
//! Lookups, listings and fulfilment on top of the order store, with
//! ownership isolation applied before anything is returned or changed.
//!
//! - [`access`]: visibility and decision rights
//! - [`query`]: listing criteria and pagination
//! - [`views`]: the projections handed to callers

pub mod access;
pub mod directory;
pub mod query;
pub mod views;

pub use directory::Directory;
pub use query::{OrderQuery, PageRequest, Pagination};
pub use views::{OrderDetail, OrderPage, TrackingView};

use crate::clients::{CartClient, OrderClient};
use crate::model::{
    Checkout, Order, OrderCreate, OrderFilter, OrderNumber, OrderStatus, PaymentStatus, Role,
    User, UserId, VendorId,
};
use crate::notify::{NotificationDispatcher, Template};
use crate::order_actor::{OrderError, ShipmentInfo};
use chrono::Utc;
use resource_actor::ActorClient;
use serde_json::json;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct OrderManager {
    orders: OrderClient,
    carts: CartClient,
    directory: Directory,
    notifications: NotificationDispatcher,
}

impl OrderManager {
    pub fn new(
        orders: OrderClient,
        carts: CartClient,
        directory: Directory,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            orders,
            carts,
            directory,
            notifications,
        }
    }

    /// Fetches an order by its (user-supplied) number. Malformed numbers are
    /// reported like missing ones.
    pub(crate) async fn load(&self, number: &str) -> Result<Order, OrderError> {
        let parsed = OrderNumber::parse(number)
            .ok_or_else(|| OrderError::NotFound(number.trim().to_string()))?;
        self.orders
            .get(parsed.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(parsed.to_string()))
    }

    pub(crate) async fn load_visible(&self, number: &str, user: &User) -> Result<Order, OrderError> {
        let order = self.load(number).await?;
        access::ensure_visible(user, &order)?;
        Ok(order)
    }

    /// Resolves a guest's email + number proof to the order. Any mismatch
    /// is indistinguishable from a missing order.
    pub(crate) async fn load_for_guest(&self, email: &str, number: &str) -> Result<Order, OrderError> {
        let order = self.load(number).await?;
        let owner_email = self.directory.owner_email(&order).await?;
        if access::guest_matches(&order, email, owner_email.as_deref()) {
            Ok(order)
        } else {
            Err(OrderError::NotFound(order.number.to_string()))
        }
    }

    async fn detail(&self, order: Order) -> Result<OrderDetail, OrderError> {
        let vendor = self.directory.vendor_summary(order.vendor_id).await?;
        Ok(OrderDetail { order, vendor })
    }

    #[instrument(skip(self, user), fields(user = %user.id))]
    pub async fn get_order_by_number(
        &self,
        number: &str,
        user: &User,
    ) -> Result<OrderDetail, OrderError> {
        let order = self.load_visible(number, user).await?;
        self.detail(order).await
    }

    async fn page(&self, filter: OrderFilter, page: PageRequest) -> Result<OrderPage, OrderError> {
        let mut orders = self.orders.list(filter).await?;
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        let (orders, pagination) = page.slice(orders);
        Ok(OrderPage { orders, pagination })
    }

    /// A customer's own orders, newest first.
    #[instrument(skip(self, query))]
    pub async fn list_orders(
        &self,
        owner: UserId,
        query: &OrderQuery,
    ) -> Result<OrderPage, OrderError> {
        let (filter, page) = query.parse()?;
        self.page(
            OrderFilter {
                owner: Some(owner),
                ..filter
            },
            page,
        )
        .await
    }

    /// A vendor's orders. Vendor staff see their own vendor; admins name the
    /// vendor with `vendorId`.
    #[instrument(skip(self, user, query), fields(user = %user.id))]
    pub async fn list_vendor_orders(
        &self,
        user: &User,
        query: &OrderQuery,
    ) -> Result<OrderPage, OrderError> {
        let requested = query
            .vendor_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<VendorId>()
                    .map_err(|_| OrderError::ValidationError(format!("invalid vendorId: {raw}")))
            })
            .transpose()?;
        let vendor_id = match (user.role, requested) {
            (Role::Vendor(own), None) => own,
            (Role::Vendor(own), Some(other)) if own == other => own,
            (Role::Admin, Some(vendor_id)) => vendor_id,
            (Role::Admin, None) => {
                return Err(OrderError::ValidationError("vendorId is required".into()))
            }
            _ => {
                return Err(OrderError::Forbidden(
                    "vendor orders are limited to the vendor's staff".into(),
                ))
            }
        };
        let (filter, page) = query.parse()?;
        self.page(
            OrderFilter {
                vendor_id: Some(vendor_id),
                ..filter
            },
            page,
        )
        .await
    }

    #[instrument(skip(self, email))]
    pub async fn lookup_guest_order(
        &self,
        email: &str,
        number: &str,
    ) -> Result<OrderDetail, OrderError> {
        let order = self.load_for_guest(email, number).await?;
        self.detail(order).await
    }

    #[instrument(skip(self))]
    pub async fn get_order_tracking(&self, number: &str) -> Result<TrackingView, OrderError> {
        let order = self.load(number).await?;
        Ok(TrackingView::from(&order))
    }

    /// Completes a checkout: creates the order (which validates references,
    /// captures prices and reserves stock) and closes the cart it came from.
    #[instrument(skip(self, checkout), fields(vendor = %checkout.vendor_id))]
    pub async fn place_order(&self, checkout: Checkout) -> Result<Order, OrderError> {
        let payment_reference = checkout
            .payment_reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if checkout.paid && payment_reference.is_none() {
            return Err(OrderError::ValidationError(
                "a paid checkout needs a payment reference".into(),
            ));
        }
        let placed_at = checkout.placed_at.unwrap_or_else(Utc::now);
        let number = self
            .orders
            .create_order(OrderCreate {
                number: checkout.number,
                owner: checkout.owner,
                vendor_id: checkout.vendor_id,
                lines: checkout.lines,
                payment_status: if checkout.paid {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Pending
                },
                payment_reference,
                placed_at,
            })
            .await?;

        if let Some(cart_id) = checkout.cart_id {
            if let Err(e) = self.carts.check_out(cart_id, placed_at).await {
                warn!(order = %number, cart = %cart_id, error = %e, "Cart check-out failed");
            }
        }

        let order = self
            .orders
            .get(number.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(number.to_string()))?;
        info!(order = %order.number, total = %order.total, "Checkout complete");
        Ok(order)
    }

    /// Payment capture, reported by the payment provider. Admin only.
    #[instrument(skip(self, user, reference), fields(user = %user.id))]
    pub async fn record_payment(
        &self,
        user: &User,
        number: &str,
        reference: &str,
    ) -> Result<Order, OrderError> {
        let order = self.load_visible(number, user).await?;
        if !user.role.is_admin() {
            return Err(OrderError::Forbidden(
                "only admins may record payments".into(),
            ));
        }
        self.orders
            .record_payment(&order.number, reference.to_string(), Utc::now())
            .await
    }

    /// Moves an order along the fulfilment path and tells the customer.
    #[instrument(skip(self, user, shipment), fields(user = %user.id))]
    pub async fn advance_status(
        &self,
        user: &User,
        number: &str,
        target: OrderStatus,
        shipment: Option<ShipmentInfo>,
    ) -> Result<Order, OrderError> {
        let order = self.load(number).await?;
        access::decider_for(user, &order)?;
        let updated = self
            .orders
            .advance(&order.number, target, shipment, Utc::now())
            .await?;
        info!(order = %updated.number, from = %order.status, to = %updated.status, "Status advanced");

        if let Some(recipient) = self.directory.customer_email(&updated).await {
            let shipment = updated.shipment.as_ref();
            self.notifications.send(
                recipient,
                Template::OrderStatusChanged,
                json!({
                    "orderNumber": updated.number,
                    "status": updated.status,
                    "carrier": shipment.map(|s| s.carrier.as_str()),
                    "trackingNumber": shipment.map(|s| s.tracking_number.as_str()),
                }),
            );
        }
        Ok(updated)
    }
}
