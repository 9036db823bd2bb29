//! # Notifications
//!
//! Outbound messages to customers and vendors. Delivery is someone else's
//! problem: a [`Notifier`] hands the message to the mail provider, and the
//! [`NotificationDispatcher`] runs it on a detached task with a timeout so a
//! slow provider never holds up the request that triggered it.

pub mod memory;

pub use memory::MemoryNotifier;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// The message kinds the service sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    RefundRequested,
    RefundApproved,
    RefundRejected,
    OrderCancelled,
    OrderStatusChanged,
    LowStock,
    CartReminder,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::RefundRequested => "refund_requested",
            Template::RefundApproved => "refund_approved",
            Template::RefundRejected => "refund_rejected",
            Template::OrderCancelled => "order_cancelled",
            Template::OrderStatusChanged => "order_status_changed",
            Template::LowStock => "low_stock",
            Template::CartReminder => "cart_reminder",
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Email address of the recipient.
    pub recipient: String,
    pub template: Template,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// A notifier that only logs. Used when no provider is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            recipient = %notification.recipient,
            template = %notification.template,
            data = %notification.data,
            "Notification"
        );
        Ok(())
    }
}

/// Fire-and-forget front for a [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Sends on a background task. Failures and timeouts are logged, never
    /// returned.
    pub fn send(&self, recipient: impl Into<String>, template: Template, data: serde_json::Value) {
        let notification = Notification {
            recipient: recipient.into(),
            template,
            data,
        };
        let notifier = Arc::clone(&self.notifier);
        let limit = self.timeout;
        tokio::spawn(async move {
            let recipient = notification.recipient.clone();
            match tokio::time::timeout(limit, notifier.notify(notification)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(%recipient, %template, error = %e, "Notification failed"),
                Err(_) => warn!(%recipient, %template, ?limit, "Notification timed out"),
            }
        });
    }
}
