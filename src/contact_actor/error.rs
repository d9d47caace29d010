//! Error types for the Contact actor.

use crate::error::ErrorKind;
use crate::model::{ContactKind, CustomerId};
use thiserror::Error;

/// Errors that can occur during contact operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContactError {
    #[error("Contact not found: {0}")]
    NotFound(String),

    #[error("Empty {0}")]
    EmptyValue(ContactKind),

    #[error("{kind} already recorded: {value}")]
    DuplicateValue { kind: ContactKind, value: String },

    /// Guard against a write that would leave two primaries of one kind.
    #[error("{customer_id} would have several primary {kind} entries")]
    PrimaryConflict {
        customer_id: CustomerId,
        kind: ContactKind,
    },

    #[error("Contact book already exists: {0}")]
    AlreadyExists(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ContactError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContactError::NotFound(_) => ErrorKind::NotFound,
            ContactError::EmptyValue(_) => ErrorKind::Validation,
            ContactError::DuplicateValue { .. }
            | ContactError::PrimaryConflict { .. }
            | ContactError::AlreadyExists(_) => ErrorKind::Conflict,
            ContactError::ActorCommunicationError(_) => ErrorKind::Unavailable,
        }
    }
}
