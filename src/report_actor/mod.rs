//! # Report Actors
//!
//! Two keyed stores written by the scheduled jobs:
//!
//! - stock alerts, keyed `product_N:YYYY-MM-DD`
//! - analytics snapshots, keyed `platform:YYYY-MM-DD` or `vendor_N:YYYY-MM-DD`
//!
//! Jobs write with `upsert`, whose `replaced` flag tells a first write for the
//! period from a re-run.

pub mod error;

pub use error::*;

use crate::clients::{AlertClient, SnapshotClient};
use crate::model::{
    AlertSeverity, AnalyticsSnapshot, PeriodFilter, SnapshotWrite, StockAlert, StockAlertWrite,
};
use async_trait::async_trait;
use resource_actor::{ActorEntity, ResourceActor};
use uuid::Uuid;

/// Creates the stock alert actor and its client.
pub fn new_alerts() -> (ResourceActor<StockAlert>, AlertClient) {
    let (actor, generic_client) =
        ResourceActor::with_id_generator(32, || Uuid::new_v4().to_string());
    (actor, AlertClient::new(generic_client))
}

/// Creates the analytics snapshot actor and its client.
pub fn new_snapshots() -> (ResourceActor<AnalyticsSnapshot>, SnapshotClient) {
    let (actor, generic_client) =
        ResourceActor::with_id_generator(32, || Uuid::new_v4().to_string());
    (actor, SnapshotClient::new(generic_client))
}

fn check_key(id: &str, expected: &str) -> Result<(), ReportError> {
    if id != expected {
        return Err(ReportError::ValidationError(format!(
            "key {id} does not match {expected}"
        )));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for StockAlert {
    type Id = String;
    type Create = StockAlertWrite;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Filter = PeriodFilter;
    type Context = ();
    type Error = ReportError;

    fn from_create_params(id: String, params: StockAlertWrite) -> Result<Self, Self::Error> {
        check_key(&id, &StockAlert::key_for(params.product_id, params.period))?;
        let severity = if params.stock == 0 {
            AlertSeverity::OutOfStock
        } else {
            AlertSeverity::Low
        };
        Ok(Self {
            key: id,
            product_id: params.product_id,
            vendor_id: params.vendor_id,
            product_name: params.product_name,
            stock: params.stock,
            threshold: params.threshold,
            severity,
            period: params.period,
            generated_at: params.generated_at,
        })
    }

    fn requested_id(params: &StockAlertWrite) -> Option<String> {
        Some(StockAlert::key_for(params.product_id, params.period))
    }

    fn matches(&self, filter: &PeriodFilter) -> bool {
        filter.period.map_or(true, |period| self.period == period)
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for AnalyticsSnapshot {
    type Id = String;
    type Create = SnapshotWrite;
    type Update = ();
    type Action = ();
    type ActionResult = ();
    type Filter = PeriodFilter;
    type Context = ();
    type Error = ReportError;

    fn from_create_params(id: String, params: SnapshotWrite) -> Result<Self, Self::Error> {
        check_key(&id, &AnalyticsSnapshot::key_for(params.scope, params.period))?;
        Ok(Self {
            key: id,
            scope: params.scope,
            period: params.period,
            metrics: params.metrics,
            generated_at: params.generated_at,
        })
    }

    fn requested_id(params: &SnapshotWrite) -> Option<String> {
        Some(AnalyticsSnapshot::key_for(params.scope, params.period))
    }

    fn matches(&self, filter: &PeriodFilter) -> bool {
        filter.period.map_or(true, |period| self.period == period)
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductId, VendorId};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn alert_key_must_match_payload() {
        let period = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let write = StockAlertWrite {
            product_id: ProductId(3),
            vendor_id: VendorId(1),
            product_name: "Mug".into(),
            stock: 0,
            threshold: 5,
            period,
            generated_at: Utc::now(),
        };
        let alert =
            StockAlert::from_create_params("product_3:2024-01-15".into(), write.clone()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::OutOfStock);
        assert!(StockAlert::from_create_params("product_4:2024-01-15".into(), write).is_err());
    }
}
