use super::{JobError, JobRunner, JobSummary};
use crate::cart_actor::CartError;
use crate::model::{Cart, CartFilter, CartLine, CartOwner, OrderFilter};
use crate::notify::Template;
use chrono::{DateTime, Utc};
use resource_actor::ActorClient;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

fn item_count(lines: &[CartLine]) -> u32 {
    lines
        .iter()
        .fold(0u32, |count, line| count.saturating_add(line.quantity))
}

impl JobRunner {
    async fn cart_recipient(&self, cart: &Cart) -> Option<String> {
        match &cart.owner {
            CartOwner::Guest { email } => Some(email.clone()),
            CartOwner::Registered { user_id } => match self.stores.users.get(*user_id).await {
                Ok(user) => user.map(|u| u.email),
                Err(e) => {
                    warn!(cart = %cart.id, error = %e, "Cart owner lookup failed");
                    None
                }
            },
        }
    }

    /// Whether the cart's owner placed an order after the cart's last change.
    ///
    /// Checkout closes the cart on a best-effort basis, so an idle cart may
    /// already have been bought.
    async fn ordered_since_update(&self, cart: &Cart) -> Result<bool, JobError> {
        let mut filter = OrderFilter {
            created_from: Some(cart.updated_at),
            ..OrderFilter::default()
        };
        match &cart.owner {
            CartOwner::Registered { user_id } => filter.owner = Some(*user_id),
            CartOwner::Guest { email } => filter.guest_email = Some(email.clone()),
        }
        Ok(!self.stores.orders.list(filter).await?.is_empty())
    }

    /// Reminds owners of carts idle for longer than the configured window.
    ///
    /// The reminder is recorded on the cart before the message goes out, and
    /// recording only succeeds on a cart that was never reminded, so a rerun
    /// sends nothing new. Carts whose owner ordered since are checked out
    /// instead.
    #[instrument(skip(self))]
    pub async fn cart_recovery(&self, now: DateTime<Utc>) -> Result<JobSummary, JobError> {
        let mut summary = JobSummary::new("cart-recovery", now.date_naive());
        let cutoff = now - self.settings.cart_idle;
        let carts = self
            .stores
            .carts
            .list(CartFilter {
                abandoned_before: Some(cutoff),
            })
            .await?;
        summary.scanned = carts.len();

        for cart in carts {
            if self.ordered_since_update(&cart).await? {
                match self.stores.carts.check_out(cart.id, now).await {
                    Ok(()) => info!(cart = %cart.id, "Closed cart left open by a checkout"),
                    Err(CartError::NotEligible(reason)) => {
                        debug!(cart = %cart.id, %reason, "Cart already closed");
                    }
                    Err(e) => return Err(e.into()),
                }
                continue;
            }
            match self.stores.carts.mark_reminded(cart.id, cutoff, now).await {
                Ok(()) => summary.written += 1,
                Err(CartError::NotEligible(reason)) => {
                    debug!(cart = %cart.id, %reason, "Cart no longer abandoned");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
            let Some(recipient) = self.cart_recipient(&cart).await else {
                continue;
            };
            self.notifications.send(
                recipient,
                Template::CartReminder,
                json!({
                    "cartId": cart.id,
                    "itemCount": item_count(&cart.lines),
                    "idleSince": cart.updated_at,
                }),
            );
            summary.notified += 1;
        }

        info!(
            scanned = summary.scanned,
            written = summary.written,
            notified = summary.notified,
            "Cart recovery finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductId;

    fn line(quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId(1),
            quantity,
        }
    }

    #[test]
    fn item_count_sums_quantities() {
        assert_eq!(item_count(&[]), 0);
        assert_eq!(item_count(&[line(2), line(3)]), 5);
    }

    #[test]
    fn item_count_saturates_on_huge_carts() {
        assert_eq!(item_count(&[line(u32::MAX), line(u32::MAX), line(1)]), u32::MAX);
    }
}
