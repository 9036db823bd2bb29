use crate::clients::{UserClient, VendorClient};
use crate::model::{Order, OrderOwner, VendorId, VendorSummary};
use crate::order_actor::OrderError;
use resource_actor::ActorClient;
use tracing::warn;

/// Looks up the people around an order: the customer and the vendor.
#[derive(Clone)]
pub struct Directory {
    users: UserClient,
    vendors: VendorClient,
}

impl Directory {
    pub fn new(users: UserClient, vendors: VendorClient) -> Self {
        Self { users, vendors }
    }

    pub fn users(&self) -> &UserClient {
        &self.users
    }

    pub async fn vendor_summary(&self, vendor_id: VendorId) -> Result<VendorSummary, OrderError> {
        let vendor = self
            .vendors
            .get(vendor_id)
            .await
            .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
            .ok_or_else(|| {
                OrderError::ActorCommunicationError(format!("order references missing {vendor_id}"))
            })?;
        Ok(VendorSummary::from(&vendor))
    }

    /// The registered owner's email, if the order has one.
    pub async fn owner_email(&self, order: &Order) -> Result<Option<String>, OrderError> {
        match &order.owner {
            OrderOwner::Guest { .. } => Ok(None),
            OrderOwner::Registered { user_id } => Ok(self
                .users
                .get(*user_id)
                .await
                .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
                .map(|user| user.email)),
        }
    }

    /// Where customer notifications for `order` go. Lookup failures are
    /// logged and skip the notification.
    pub async fn customer_email(&self, order: &Order) -> Option<String> {
        if let Some(email) = order.guest_email() {
            return Some(email.to_string());
        }
        match self.owner_email(order).await {
            Ok(email) => email,
            Err(e) => {
                warn!(order = %order.number, error = %e, "Customer lookup failed");
                None
            }
        }
    }

    pub async fn vendor_email(&self, vendor_id: VendorId) -> Option<String> {
        match self.vendors.get(vendor_id).await {
            Ok(vendor) => vendor.map(|v| v.contact_email),
            Err(e) => {
                warn!(vendor = %vendor_id, error = %e, "Vendor lookup failed");
                None
            }
        }
    }
}
