//! In-process gateway that records refunds and can be scripted to fail or
//! stall.

use super::{GatewayError, PaymentGateway, RefundCall, RefundReceipt};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Scripted behaviour for the next call.
#[derive(Debug, Clone)]
pub enum SandboxOutcome {
    Fail(GatewayError),
    /// Sleeps before answering normally.
    Delay(Duration),
}

#[derive(Default)]
struct SandboxState {
    script: VecDeque<SandboxOutcome>,
    issued: HashMap<String, (RefundCall, RefundReceipt)>,
    calls: usize,
}

/// A [`PaymentGateway`] that issues refunds in memory, idempotent by key.
#[derive(Default)]
pub struct SandboxGateway {
    state: Mutex<SandboxState>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the behaviour of the next unscripted call.
    pub fn push_outcome(&self, outcome: SandboxOutcome) {
        self.lock().script.push_back(outcome);
    }

    pub fn fail_next(&self, error: GatewayError) {
        self.push_outcome(SandboxOutcome::Fail(error));
    }

    pub fn delay_next(&self, delay: Duration) {
        self.push_outcome(SandboxOutcome::Delay(delay));
    }

    /// Distinct refunds issued (repeated keys count once).
    pub fn refunds_issued(&self) -> usize {
        self.lock().issued.len()
    }

    /// Every call received, including failed and repeated ones.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SandboxState> {
        // The state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn refund(&self, call: RefundCall) -> Result<RefundReceipt, GatewayError> {
        let outcome = {
            let mut state = self.lock();
            state.calls += 1;
            state.script.pop_front()
        };
        match outcome {
            Some(SandboxOutcome::Fail(error)) => return Err(error),
            Some(SandboxOutcome::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }

        let mut state = self.lock();
        if let Some((_, receipt)) = state.issued.get(&call.idempotency_key) {
            info!(key = %call.idempotency_key, "Replaying refund for known key");
            return Ok(receipt.clone());
        }
        let receipt = RefundReceipt {
            transaction_id: format!("rf_{}", Uuid::new_v4().simple()),
        };
        info!(
            key = %call.idempotency_key,
            amount = %call.amount,
            transaction = %receipt.transaction_id,
            "Refund issued"
        );
        state
            .issued
            .insert(call.idempotency_key.clone(), (call, receipt.clone()));
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn call(key: &str) -> RefundCall {
        RefundCall {
            payment_reference: "pay_1".into(),
            amount: Decimal::new(4999, 2),
            idempotency_key: key.into(),
        }
    }

    #[tokio::test]
    async fn repeated_key_returns_the_original_receipt() {
        let gateway = SandboxGateway::new();
        let first = gateway.refund(call("k1")).await.unwrap();
        let second = gateway.refund(call("k1")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.refunds_issued(), 1);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn scripted_failure_applies_to_one_call() {
        let gateway = SandboxGateway::new();
        gateway.fail_next(GatewayError::Unavailable("maintenance".into()));
        assert!(gateway.refund(call("k1")).await.is_err());
        assert!(gateway.refund(call("k1")).await.is_ok());
        assert_eq!(gateway.refunds_issued(), 1);
    }
}
