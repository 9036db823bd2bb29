//! Error types for the Order actor and the services built on it.

use crate::model::{OrderStatus, ProductId};
use crate::product_actor::ProductError;
use resource_actor::FrameworkError;
use thiserror::Error;

/// Errors that can occur during order operations.
///
/// Validation and authorization variants are raised before any mutation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The order does not exist or is not visible to the caller.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// No authenticated caller.
    #[error("Authentication required")]
    Unauthorized,

    /// The caller can see the order but may not perform this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The status change is not in the state machine.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The order already has an active refund request.
    #[error("A refund has already been requested for order {0}")]
    AlreadyRequested(String),

    /// The refund request was already decided, or is being decided.
    #[error("The refund request for order {0} has already been decided")]
    AlreadyDecided(String),

    /// The order cannot enter the requested workflow in its current state.
    #[error("Order not eligible: {0}")]
    NotEligible(String),

    /// The payment gateway failed or did not answer in time.
    #[error("Payment gateway error: {0}")]
    GatewayError(String),

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    ValidationError(String),

    /// There is insufficient stock to fulfill the order.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Maps a stock failure for `product` into the order taxonomy.
    pub fn from_product(product: ProductId, e: ProductError) -> Self {
        match e {
            ProductError::InsufficientStock {
                requested,
                available,
            } => OrderError::InsufficientStock {
                product,
                requested,
                available,
            },
            ProductError::NotFound(_) => {
                OrderError::ValidationError(format!("unknown product {product}"))
            }
            ProductError::InvalidQuantity(quantity) => {
                OrderError::ValidationError(format!("invalid quantity {quantity} for {product}"))
            }
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            ProductError::ActorCommunicationError(msg) => OrderError::ActorCommunicationError(msg),
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<OrderError>() {
            Ok(typed) => typed,
            Err(FrameworkError::NotFound(id)) => OrderError::NotFound(id),
            Err(other) => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_survive_the_store_boundary() {
        let boxed = FrameworkError::EntityError(Box::new(OrderError::AlreadyRequested(
            "LM-2401-AB12".into(),
        )));
        assert_eq!(
            OrderError::from(boxed),
            OrderError::AlreadyRequested("LM-2401-AB12".into())
        );
        assert_eq!(
            OrderError::from(FrameworkError::NotFound("LM-2401-ZZZZ".into())),
            OrderError::NotFound("LM-2401-ZZZZ".into())
        );
        assert!(matches!(
            OrderError::from(FrameworkError::ActorClosed),
            OrderError::ActorCommunicationError(_)
        ));
    }

    #[test]
    fn stock_shortage_keeps_the_product() {
        let e = OrderError::from_product(
            ProductId(4),
            ProductError::InsufficientStock {
                requested: 5,
                available: 2,
            },
        );
        assert_eq!(
            e,
            OrderError::InsufficientStock {
                product: ProductId(4),
                requested: 5,
                available: 2
            }
        );
    }
}
