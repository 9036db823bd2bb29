use crate::model::{CartId, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shopping cart. Carts that stay idle without checking out are the
/// target of the recovery reminder job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
    pub checked_out: bool,
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Not checked out, non-empty, untouched since `cutoff` and never reminded.
    pub fn is_abandoned(&self, cutoff: DateTime<Utc>) -> bool {
        !self.checked_out
            && !self.lines.is_empty()
            && self.updated_at <= cutoff
            && self.reminder_sent_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CartOwner {
    Registered { user_id: UserId },
    Guest { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CartCreate {
    pub owner: CartOwner,
    pub lines: Vec<CartLine>,
    pub at: DateTime<Utc>,
}

/// Replaces the cart contents and refreshes `updated_at`.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    pub lines: Vec<CartLine>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CartFilter {
    /// Only carts abandoned as of this cutoff.
    pub abandoned_before: Option<DateTime<Utc>>,
}
