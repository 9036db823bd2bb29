//! # Vendor Actor
//!
//! Marketplace tenants. Orders reference a vendor, and vendor notifications
//! go to its contact email.

pub mod error;

pub use error::*;

use crate::clients::VendorClient;
use crate::model::{Vendor, VendorCreate, VendorId, VendorUpdate};
use crate::user_actor::looks_like_email;
use async_trait::async_trait;
use resource_actor::{ActorEntity, ResourceActor};

/// Creates a new Vendor actor and its client.
pub fn new() -> (ResourceActor<Vendor>, VendorClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, VendorClient::new(generic_client))
}

#[async_trait]
impl ActorEntity for Vendor {
    type Id = VendorId;
    type Create = VendorCreate;
    type Update = VendorUpdate;
    type Action = ();
    type ActionResult = ();
    type Filter = ();
    type Context = ();
    type Error = VendorError;

    fn from_create_params(id: VendorId, params: VendorCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(VendorError::ValidationError("name is required".into()));
        }
        if !looks_like_email(&params.contact_email) {
            return Err(VendorError::ValidationError(format!(
                "invalid contact email: {}",
                params.contact_email
            )));
        }
        Ok(Self {
            id,
            name: params.name,
            contact_email: params.contact_email,
        })
    }

    async fn on_update(&mut self, update: VendorUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.contact_email {
            if !looks_like_email(&email) {
                return Err(VendorError::ValidationError(format!(
                    "invalid contact email: {email}"
                )));
            }
            self.contact_email = email;
        }
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
