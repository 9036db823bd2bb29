//! # Scheduled Jobs
//!
//! Triggered from outside (the cron endpoints) and idempotent per period:
//! outputs are upserted by `<subject>:<period>` and notifications go out
//! only on the first write, so a retried or doubled trigger does no harm.
//!
//! - [`inventory`]: low-stock alerts
//! - [`analytics`]: daily order aggregates
//! - [`cart_recovery`]: reminders for abandoned carts

pub mod analytics;
pub mod cart_recovery;
pub mod inventory;

use crate::cart_actor::CartError;
use crate::clients::{
    AlertClient, CartClient, OrderClient, ProductClient, SnapshotClient, UserClient, VendorClient,
};
use crate::notify::NotificationDispatcher;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::report_actor::ReportError;
use crate::user_actor::UserError;
use crate::vendor_actor::VendorError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(String),
}

impl From<ProductError> for JobError {
    fn from(e: ProductError) -> Self {
        JobError::Store(e.to_string())
    }
}

impl From<ReportError> for JobError {
    fn from(e: ReportError) -> Self {
        JobError::Store(e.to_string())
    }
}

impl From<OrderError> for JobError {
    fn from(e: OrderError) -> Self {
        JobError::Store(e.to_string())
    }
}

impl From<VendorError> for JobError {
    fn from(e: VendorError) -> Self {
        JobError::Store(e.to_string())
    }
}

impl From<CartError> for JobError {
    fn from(e: CartError) -> Self {
        JobError::Store(e.to_string())
    }
}

impl From<UserError> for JobError {
    fn from(e: UserError) -> Self {
        JobError::Store(e.to_string())
    }
}

/// What a job run looked at and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub job: &'static str,
    pub period: String,
    pub scanned: usize,
    pub written: usize,
    pub notified: usize,
}

impl JobSummary {
    fn new(job: &'static str, period: impl ToString) -> Self {
        Self {
            job,
            period: period.to_string(),
            scanned: 0,
            written: 0,
            notified: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JobSettings {
    /// Used for products without their own threshold.
    pub low_stock_threshold: u32,
    /// How long a cart must sit idle before it counts as abandoned.
    pub cart_idle: chrono::Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            cart_idle: chrono::Duration::hours(24),
        }
    }
}

/// The stores the jobs read and write.
#[derive(Clone)]
pub struct JobStores {
    pub users: UserClient,
    pub vendors: VendorClient,
    pub products: ProductClient,
    pub orders: OrderClient,
    pub carts: CartClient,
    pub alerts: AlertClient,
    pub snapshots: SnapshotClient,
}

#[derive(Clone)]
pub struct JobRunner {
    stores: JobStores,
    notifications: NotificationDispatcher,
    settings: JobSettings,
}

impl JobRunner {
    pub fn new(
        stores: JobStores,
        notifications: NotificationDispatcher,
        settings: JobSettings,
    ) -> Self {
        Self {
            stores,
            notifications,
            settings,
        }
    }
}
