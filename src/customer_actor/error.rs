//! Error types for the Customer actor.

use crate::error::{ErrorKind, Precondition};
use thiserror::Error;

/// Errors that can occur during customer operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("Customer not found: {0}")]
    NotFound(String),

    #[error("Customer alias is empty")]
    EmptyAlias,

    #[error("Customer name is empty")]
    EmptyName,

    /// Another customer already uses this alias.
    #[error("Alias already taken: {0}")]
    AliasTaken(String),

    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl CustomerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CustomerError::NotFound(_) => ErrorKind::NotFound,
            CustomerError::EmptyAlias | CustomerError::EmptyName => ErrorKind::Validation,
            CustomerError::AliasTaken(_) => ErrorKind::Conflict,
            CustomerError::Precondition(_) => ErrorKind::PreconditionFailed,
            CustomerError::ActorCommunicationError(_) => ErrorKind::Unavailable,
        }
    }
}
