use resource_actor::FrameworkError;
use thiserror::Error;

/// Errors raised by the alert and snapshot stores.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReportError {
    #[error("Report validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ReportError {
    fn from(e: FrameworkError) -> Self {
        match e.downcast_entity::<ReportError>() {
            Ok(typed) => typed,
            Err(other) => ReportError::ActorCommunicationError(other.to_string()),
        }
    }
}
