//! # Cart Actor
//!
//! Shopping carts and the bookkeeping the recovery job needs: when a cart was
//! last touched, whether it was checked out and whether a reminder went out.

pub mod error;

pub use error::*;

use crate::clients::CartClient;
use crate::model::{Cart, CartCreate, CartFilter, CartId, CartOwner, CartUpdate};
use crate::user_actor::looks_like_email;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use resource_actor::{ActorEntity, ResourceActor};

/// Custom actions for Cart entities.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Marks the cart as converted into an order.
    CheckOut { at: DateTime<Utc> },
    /// Records a recovery reminder, only if the cart is still abandoned as of
    /// `cutoff`. Fails with `NotEligible` otherwise, so a reminder is sent at
    /// most once.
    MarkReminded {
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    },
}

/// Creates a new Cart actor and its client.
pub fn new() -> (ResourceActor<Cart>, CartClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, CartClient::new(generic_client))
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = CartId;
    type Create = CartCreate;
    type Update = CartUpdate;
    type Action = CartAction;
    type ActionResult = ();
    type Filter = CartFilter;
    type Context = ();
    type Error = CartError;

    fn from_create_params(id: CartId, params: CartCreate) -> Result<Self, Self::Error> {
        if let CartOwner::Guest { email } = &params.owner {
            if !looks_like_email(email) {
                return Err(CartError::ValidationError(format!("invalid email: {email}")));
            }
        }
        if params.lines.iter().any(|line| line.quantity == 0) {
            return Err(CartError::ValidationError("quantities must be at least 1".into()));
        }
        Ok(Self {
            id,
            owner: params.owner,
            lines: params.lines,
            updated_at: params.at,
            checked_out: false,
            reminder_sent_at: None,
        })
    }

    fn matches(&self, filter: &CartFilter) -> bool {
        filter
            .abandoned_before
            .map_or(true, |cutoff| self.is_abandoned(cutoff))
    }

    async fn on_update(&mut self, update: CartUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if self.checked_out {
            return Err(CartError::NotEligible(format!("{} is checked out", self.id)));
        }
        if update.lines.iter().any(|line| line.quantity == 0) {
            return Err(CartError::ValidationError("quantities must be at least 1".into()));
        }
        self.lines = update.lines;
        self.updated_at = update.at;
        // Activity after a reminder makes the cart eligible again later.
        self.reminder_sent_at = None;
        Ok(())
    }

    async fn handle_action(&mut self, action: CartAction, _ctx: &()) -> Result<(), Self::Error> {
        match action {
            CartAction::CheckOut { at } => {
                if self.checked_out {
                    return Err(CartError::NotEligible(format!("{} is checked out", self.id)));
                }
                self.checked_out = true;
                self.updated_at = at;
            }
            CartAction::MarkReminded { cutoff, at } => {
                if !self.is_abandoned(cutoff) {
                    return Err(CartError::NotEligible(format!(
                        "{} is not abandoned",
                        self.id
                    )));
                }
                self.reminder_sent_at = Some(at);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CartLine, ProductId, UserId};
    use chrono::TimeZone;

    fn stale_cart() -> Cart {
        Cart::from_create_params(
            CartId(1),
            CartCreate {
                owner: CartOwner::Registered { user_id: UserId(1) },
                lines: vec![CartLine {
                    product_id: ProductId(1),
                    quantity: 1,
                }],
                at: Utc.with_ymd_and_hms(2024, 1, 14, 8, 0, 0).unwrap(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reminder_is_recorded_once() {
        let mut cart = stale_cart();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let cutoff = now - chrono::Duration::hours(24);

        cart.handle_action(CartAction::MarkReminded { cutoff, at: now }, &())
            .await
            .unwrap();
        assert_eq!(cart.reminder_sent_at, Some(now));
        assert!(matches!(
            cart.handle_action(CartAction::MarkReminded { cutoff, at: now }, &())
                .await,
            Err(CartError::NotEligible(_))
        ));
    }

    #[tokio::test]
    async fn checked_out_carts_are_not_abandoned() {
        let mut cart = stale_cart();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        cart.handle_action(CartAction::CheckOut { at: now }, &())
            .await
            .unwrap();
        assert!(!cart.is_abandoned(now));
    }
}
