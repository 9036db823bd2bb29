//! Job outputs: stock alerts and analytics snapshots.
//!
//! Both are keyed by `<subject>:<period>` and written with upsert, so
//! re-running a job for the same period overwrites rather than duplicates.

use crate::model::{ProductId, VendorId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    OutOfStock,
}

/// A low-stock alert for one product and one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub key: String,
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub stock: u32,
    pub threshold: u32,
    pub severity: AlertSeverity,
    pub period: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

impl StockAlert {
    pub fn key_for(product_id: ProductId, period: NaiveDate) -> String {
        format!("{product_id}:{period}")
    }
}

/// Payload for writing an alert. The key is derived from product and period.
#[derive(Debug, Clone)]
pub struct StockAlertWrite {
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub product_name: String,
    pub stock: u32,
    pub threshold: u32,
    pub period: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

/// What an analytics snapshot aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "vendorId")]
pub enum SnapshotScope {
    Platform,
    Vendor(VendorId),
}

impl std::fmt::Display for SnapshotScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotScope::Platform => f.write_str("platform"),
            SnapshotScope::Vendor(vendor_id) => write!(f, "{vendor_id}"),
        }
    }
}

/// Order aggregates over one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub key: String,
    pub scope: SnapshotScope,
    pub period: NaiveDate,
    #[serde(flatten)]
    pub metrics: SnapshotMetrics,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    pub fn key_for(scope: SnapshotScope, period: NaiveDate) -> String {
        format!("{scope}:{period}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetrics {
    pub order_count: u32,
    /// Sum of totals of orders that were paid (including later refunded ones).
    pub gross_revenue: Decimal,
    pub refunded_amount: Decimal,
    pub refund_count: u32,
    pub cancelled_count: u32,
    /// Gross revenue over paid orders, rounded to cents.
    pub average_order_value: Decimal,
    pub status_counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct SnapshotWrite {
    pub scope: SnapshotScope,
    pub period: NaiveDate,
    pub metrics: SnapshotMetrics,
    pub generated_at: DateTime<Utc>,
}

/// Criteria for listing reports of either kind.
#[derive(Debug, Clone, Default)]
pub struct PeriodFilter {
    pub period: Option<NaiveDate>,
}
