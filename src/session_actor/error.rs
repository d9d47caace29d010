//! Error types for the Session actor.

use crate::error::{ErrorKind, Precondition};
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Another session is already open")]
    AlreadyOpen,

    #[error("Session name is empty")]
    EmptyName,

    #[error(transparent)]
    Precondition(#[from] Precondition),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::AlreadyOpen => ErrorKind::Conflict,
            SessionError::EmptyName => ErrorKind::Validation,
            SessionError::Precondition(_) => ErrorKind::PreconditionFailed,
            SessionError::ActorCommunicationError(_) => ErrorKind::Unavailable,
        }
    }
}
