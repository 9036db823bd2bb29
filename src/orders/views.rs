//! Read-side projections returned by the order manager.

use super::query::Pagination;
use crate::model::{Order, OrderNumber, OrderStatus, VendorSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An order with its vendor, as shown to the people allowed to see it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub vendor: VendorSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

/// Public shipment tracking. Carries no amounts, addresses or names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub item_count: u32,
}

impl From<&Order> for TrackingView {
    fn from(order: &Order) -> Self {
        let shipment = order.shipment.as_ref();
        Self {
            order_number: order.number.clone(),
            status: order.status,
            carrier: shipment.map(|s| s.carrier.clone()),
            tracking_number: shipment.map(|s| s.tracking_number.clone()),
            shipped_at: shipment.map(|s| s.shipped_at),
            delivered_at: shipment.and_then(|s| s.delivered_at),
            item_count: order.item_count(),
        }
    }
}
