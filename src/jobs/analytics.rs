use super::{JobError, JobRunner, JobSummary};
use crate::model::{
    Order, OrderFilter, OrderStatus, PaymentStatus, SnapshotMetrics, SnapshotScope, SnapshotWrite,
    VendorId,
};
use chrono::{Days, NaiveDate, TimeZone, Utc};
use resource_actor::ActorClient;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Aggregates one group of orders.
///
/// Revenue counts orders whose payment was captured, including those later
/// refunded; the refunded part is reported separately.
pub fn aggregate<'a>(orders: impl IntoIterator<Item = &'a Order>) -> SnapshotMetrics {
    let mut metrics = SnapshotMetrics::default();
    let mut paid_orders = 0u32;
    for order in orders {
        metrics.order_count += 1;
        *metrics
            .status_counts
            .entry(order.status.as_str().to_string())
            .or_insert(0) += 1;
        if order.status == OrderStatus::Cancelled {
            metrics.cancelled_count += 1;
        }
        match order.payment_status {
            PaymentStatus::Paid => {
                paid_orders += 1;
                metrics.gross_revenue += order.total;
            }
            PaymentStatus::Refunded => {
                paid_orders += 1;
                metrics.gross_revenue += order.total;
                metrics.refunded_amount += order.total;
                metrics.refund_count += 1;
            }
            PaymentStatus::Pending | PaymentStatus::Failed => {}
        }
    }
    if paid_orders > 0 {
        metrics.average_order_value =
            (metrics.gross_revenue / Decimal::from(paid_orders)).round_dp(2);
    }
    metrics
}

impl JobRunner {
    /// Writes the platform snapshot and one per vendor for orders created on
    /// `date` (UTC). Vendors without orders that day get an empty snapshot.
    #[instrument(skip(self))]
    pub async fn analytics_snapshot(&self, date: NaiveDate) -> Result<JobSummary, JobError> {
        let mut summary = JobSummary::new("analytics-snapshot", date);
        let start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        let end = start + Days::new(1);

        let orders: Vec<Order> = self
            .stores
            .orders
            .list(OrderFilter {
                created_from: Some(start),
                ..OrderFilter::default()
            })
            .await?
            .into_iter()
            .filter(|order| order.created_at < end)
            .collect();
        summary.scanned = orders.len();

        let mut by_vendor: BTreeMap<VendorId, Vec<&Order>> = self
            .stores
            .vendors
            .list(())
            .await?
            .into_iter()
            .map(|vendor| (vendor.id, Vec::new()))
            .collect();
        for order in &orders {
            by_vendor.entry(order.vendor_id).or_default().push(order);
        }

        let generated_at = Utc::now();
        let mut snapshots = vec![(SnapshotScope::Platform, aggregate(&orders))];
        snapshots.extend(
            by_vendor
                .into_iter()
                .map(|(vendor_id, group)| (SnapshotScope::Vendor(vendor_id), aggregate(group))),
        );
        for (scope, metrics) in snapshots {
            self.stores
                .snapshots
                .record(SnapshotWrite {
                    scope,
                    period: date,
                    metrics,
                    generated_at,
                })
                .await?;
            summary.written += 1;
        }

        info!(
            scanned = summary.scanned,
            written = summary.written,
            "Analytics snapshot finished"
        );
        Ok(summary)
    }
}
