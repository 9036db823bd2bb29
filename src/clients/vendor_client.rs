use crate::model::{Vendor, VendorCreate, VendorId};
use crate::vendor_actor::VendorError;
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient};
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for interacting with the Vendor actor.
#[derive(Clone)]
pub struct VendorClient {
    inner: ResourceClient<Vendor>,
}

impl VendorClient {
    pub fn new(inner: ResourceClient<Vendor>) -> Self {
        Self { inner }
    }

    /// Bounds every request to the store.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.with_timeout(timeout),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_vendor(&self, params: VendorCreate) -> Result<VendorId, VendorError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(VendorError::from)
    }
}

#[async_trait]
impl ActorClient<Vendor> for VendorClient {
    type Error = VendorError;

    fn inner(&self) -> &ResourceClient<Vendor> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        VendorError::from(e)
    }
}
