/// Represents a marketplace order.
///
/// # Resource Actor
/// This struct implements the [`ActorEntity`](resource_actor::ActorEntity)
/// trait and is keyed by its [`OrderNumber`].
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for:
/// - Creation parameters ([`OrderCreate`]) and the checks run before storing
/// - Lifecycle actions ([`OrderAction`](crate::order_actor::OrderAction))
use crate::model::{
    same_email, CartId, OrderNumber, OrderStatus, PaymentStatus, ProductId, RefundRequest,
    UserId, VendorId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub number: OrderNumber,
    pub owner: OrderOwner,
    pub vendor_id: VendorId,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub shipment: Option<Shipment>,
    /// The active refund/cancellation request, if any.
    pub refund: Option<RefundRequest>,
    /// Resolved requests, oldest first.
    pub refund_history: Vec<RefundRequest>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn owned_by(&self, user_id: UserId) -> bool {
        matches!(self.owner, OrderOwner::Registered { user_id: owner } if owner == user_id)
    }

    pub fn guest_email(&self) -> Option<&str> {
        match &self.owner {
            OrderOwner::Guest { email, .. } => Some(email),
            OrderOwner::Registered { .. } => None,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Case-insensitive match on the order number or any item's product name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.number.as_str().to_lowercase().contains(&needle)
            || self
                .items
                .iter()
                .any(|item| item.product_name.to_lowercase().contains(&needle))
    }
}

/// Registered customer XOR guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum OrderOwner {
    Registered { user_id: UserId },
    Guest { email: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    pub quantity: u32,
    /// Captured at purchase; later catalog price changes do not apply.
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub carrier: String,
    pub tracking_number: String,
    pub shipped_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// One requested line at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payload for creating an order at checkout completion.
///
/// Prices and product names are not part of the payload; the order store
/// captures them from the catalog while reserving stock.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    /// A pre-assigned number (imports); `None` draws a fresh one.
    pub number: Option<OrderNumber>,
    pub owner: OrderOwner,
    pub vendor_id: VendorId,
    pub lines: Vec<OrderLine>,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub placed_at: DateTime<Utc>,
}

/// Checkout input accepted by the order manager.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub owner: OrderOwner,
    pub vendor_id: VendorId,
    pub lines: Vec<OrderLine>,
    pub payment_reference: Option<String>,
    /// Whether the payment was captured at checkout.
    pub paid: bool,
    pub cart_id: Option<CartId>,
    pub number: Option<OrderNumber>,
    pub placed_at: Option<DateTime<Utc>>,
}

/// Criteria for order listings. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub owner: Option<UserId>,
    pub guest_email: Option<String>,
    pub vendor_id: Option<VendorId>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(owner) = self.owner {
            if !order.owned_by(owner) {
                return false;
            }
        }
        if let Some(email) = &self.guest_email {
            if !order.guest_email().is_some_and(|guest| same_email(guest, email)) {
                return false;
            }
        }
        if self.vendor_id.is_some_and(|vendor| order.vendor_id != vendor) {
            return false;
        }
        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }
        if let Some(needle) = &self.search {
            if !order.matches_search(needle) {
                return false;
            }
        }
        if self.created_from.is_some_and(|from| order.created_at < from) {
            return false;
        }
        !self.created_to.is_some_and(|to| order.created_at > to)
    }
}
