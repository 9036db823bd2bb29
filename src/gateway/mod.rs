//! # Payment Gateway
//!
//! The refund capability of the payment provider, behind a trait so the
//! workflow can be driven by the sandbox in tests and demos.
//!
//! Calls carry an idempotency key (the refund request id). A gateway must
//! answer a repeated key with the original result instead of refunding twice,
//! which is what makes retrying a timed-out approval safe.

pub mod sandbox;

pub use sandbox::SandboxGateway;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

/// A refund to issue against a captured payment.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundCall {
    pub payment_reference: String,
    pub amount: Decimal,
    pub idempotency_key: String,
}

/// Proof of an issued refund.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundReceipt {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Refund declined: {0}")]
    Declined(String),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn refund(&self, call: RefundCall) -> Result<RefundReceipt, GatewayError>;
}
