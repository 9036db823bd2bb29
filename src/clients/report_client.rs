//! Clients for the job output stores.
use crate::model::{
    AnalyticsSnapshot, SnapshotWrite, StockAlert, StockAlertWrite,
};
use crate::report_actor::ReportError;
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use std::time::Duration;
use tracing::instrument;

/// Client for the stock alert store.
#[derive(Clone)]
pub struct AlertClient {
    inner: ResourceClient<StockAlert>,
}

impl AlertClient {
    pub fn new(inner: ResourceClient<StockAlert>) -> Self {
        Self { inner }
    }

    /// Bounds every request to the store.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    /// Writes the alert for its product and period. Returns `true` if an
    /// alert for that period already existed.
    #[instrument(skip(self), fields(product = %alert.product_id, period = %alert.period))]
    pub async fn record(&self, alert: StockAlertWrite) -> Result<bool, ReportError> {
        let key = StockAlert::key_for(alert.product_id, alert.period);
        self.inner.upsert(key, alert).await.map_err(ReportError::from)
    }
}

#[async_trait]
impl ActorClient<StockAlert> for AlertClient {
    type Error = ReportError;

    fn inner(&self) -> &ResourceClient<StockAlert> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ReportError::from(e)
    }
}

/// Client for the analytics snapshot store.
#[derive(Clone)]
pub struct SnapshotClient {
    inner: ResourceClient<AnalyticsSnapshot>,
}

impl SnapshotClient {
    pub fn new(inner: ResourceClient<AnalyticsSnapshot>) -> Self {
        Self { inner }
    }

    /// Bounds every request to the store.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    /// Writes the snapshot for its scope and period. Returns `true` if it
    /// replaced an earlier one.
    #[instrument(skip(self), fields(scope = %snapshot.scope, period = %snapshot.period))]
    pub async fn record(&self, snapshot: SnapshotWrite) -> Result<bool, ReportError> {
        let key = AnalyticsSnapshot::key_for(snapshot.scope, snapshot.period);
        self.inner
            .upsert(key, snapshot)
            .await
            .map_err(ReportError::from)
    }
}

#[async_trait]
impl ActorClient<AnalyticsSnapshot> for SnapshotClient {
    type Error = ReportError;

    fn inner(&self) -> &ResourceClient<AnalyticsSnapshot> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        ReportError::from(e)
    }
}
