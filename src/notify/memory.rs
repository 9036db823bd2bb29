use super::{Notification, Notifier, NotifyError, Template};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Records every notification instead of delivering it.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
    arrived: Notify,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn sent_with(&self, template: Template) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| n.template == template)
            .cloned()
            .collect()
    }

    /// Waits until at least `count` notifications arrived or `limit` elapsed,
    /// then returns what was recorded.
    pub async fn wait_for(&self, count: usize, limit: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let arrived = self.arrived.notified();
            if self.lock().len() >= count {
                break;
            }
            if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                break;
            }
        }
        self.sent()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.lock().push(notification);
        self.arrived.notify_waiters();
        Ok(())
    }
}
