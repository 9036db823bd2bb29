use resource_actor::FrameworkError;
use thiserror::Error;

/// Errors that can occur during vendor operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VendorError {
    #[error("Vendor not found: {0}")]
    NotFound(String),

    #[error("Vendor validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for VendorError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<VendorError>() {
            Ok(typed) => typed,
            Err(FrameworkError::NotFound(id)) => VendorError::NotFound(id),
            Err(other) => VendorError::ActorCommunicationError(other.to_string()),
        }
    }
}
