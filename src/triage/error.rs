//! Flow error types
//!
//! Every error is reported to whoever triggered the action. Nothing here
//! is retried or queued.

use super::guard::Action;
use super::state::FlowStep;
use crate::backend::BackendError;
use thiserror::Error;

/// Errors raised by the triage flow and doctor dashboard controllers
#[derive(Error, Debug)]
pub enum FlowError {
    /// A required field is missing; raised before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The request failed or the backend rejected it
    #[error("Network error: {0}")]
    Network(#[from] BackendError),

    /// The action needs a logged-in identity of the right role
    #[error("Please login first")]
    Unauthenticated,

    /// Another action of the same kind has not finished yet
    #[error("{0} already in progress")]
    InFlight(Action),

    #[error("Cannot {action} from the {step} step")]
    WrongStep { action: &'static str, step: FlowStep },
}

impl FlowError {
    /// Text for a user-facing notice
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Network(BackendError::Api { message, .. }) => message.clone(),
            FlowError::Network(_) => "Server Error".to_string(),
            other => other.to_string(),
        }
    }
}
