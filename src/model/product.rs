use crate::model::{ProductId, VendorId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product with its stock level.
///
/// See [`impl ActorEntity for Product`](#impl-ActorEntity-for-Product) for
/// the stock actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub vendor_id: VendorId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    /// Overrides the platform-wide low-stock threshold.
    pub low_stock_threshold: Option<u32>,
}

impl Product {
    pub fn threshold(&self, default_threshold: u32) -> u32 {
        self.low_stock_threshold.unwrap_or(default_threshold)
    }
}

/// Payload for adding a product to a vendor's catalog.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub vendor_id: VendorId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    pub low_stock_threshold: Option<u32>,
}

/// Payload for catalog edits. Stock is changed through actions only.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub low_stock_threshold: Option<u32>,
}

/// Criteria for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub vendor_id: Option<VendorId>,
}
