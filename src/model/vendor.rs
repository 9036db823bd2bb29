use crate::model::VendorId;
use serde::{Deserialize, Serialize};

/// A marketplace tenant selling its own products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub contact_email: String,
}

/// Payload for registering a vendor.
#[derive(Debug, Clone)]
pub struct VendorCreate {
    pub name: String,
    pub contact_email: String,
}

/// Payload for updating vendor details.
#[derive(Debug, Clone, Default)]
pub struct VendorUpdate {
    pub name: Option<String>,
    pub contact_email: Option<String>,
}

/// The part of a vendor shown next to an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorSummary {
    pub id: VendorId,
    pub name: String,
}

impl From<&Vendor> for VendorSummary {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id,
            name: vendor.name.clone(),
        }
    }
}
