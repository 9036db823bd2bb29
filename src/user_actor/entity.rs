//! [`ActorEntity`] implementation for [`User`].

use super::error::{looks_like_email, UserError};
use crate::model::{User, UserCreate, UserId, UserUpdate};
use async_trait::async_trait;
use resource_actor::ActorEntity;

#[async_trait]
impl ActorEntity for User {
    type Id = UserId;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Action = ();
    type ActionResult = ();
    type Filter = ();
    type Context = ();
    type Error = UserError;

    fn from_create_params(id: UserId, params: UserCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(UserError::ValidationError("name is required".into()));
        }
        if !looks_like_email(&params.email) {
            return Err(UserError::ValidationError(format!(
                "invalid email: {}",
                params.email
            )));
        }
        Ok(Self {
            id,
            name: params.name.trim().to_string(),
            email: params.email.trim().to_string(),
            role: params.role,
        })
    }

    /// # Fields Updated
    /// - `name`: display name
    /// - `email`: contact address, validated
    async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            if !looks_like_email(&email) {
                return Err(UserError::ValidationError(format!("invalid email: {email}")));
            }
            self.email = email;
        }
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), Self::Error> {
        Ok(())
    }
}
