//! Error types for the Order actor.

use crate::error::{ErrorKind, Precondition};
use crate::model::{LineId, LINE_CODE_KEY_PREFIX};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Line not found: {0}")]
    UnknownLine(LineId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Deposit {deposit} exceeds order total {total}")]
    DepositExceedsTotal { deposit: f64, total: f64 },

    #[error("Cash is not accepted for province orders")]
    CashNotAllowedForProvince,

    #[error(transparent)]
    Precondition(#[from] Precondition),

    /// Deleting an order that still has lines.
    #[error("Order still has {0} line(s)")]
    NotEmpty(usize),

    #[error("Unique key already taken: {0}")]
    UniqueViolation(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotFound(_) | OrderError::UnknownLine(_) => ErrorKind::NotFound,
            OrderError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            OrderError::MissingField(_)
            | OrderError::DepositExceedsTotal { .. }
            | OrderError::CashNotAllowedForProvince => ErrorKind::Validation,
            OrderError::Precondition(_) => ErrorKind::PreconditionFailed,
            OrderError::NotEmpty(_) => ErrorKind::Conflict,
            OrderError::UniqueViolation(key) if key.starts_with(LINE_CODE_KEY_PREFIX) => {
                ErrorKind::DuplicateCode
            }
            OrderError::UniqueViolation(_) => ErrorKind::Conflict,
            OrderError::ActorCommunicationError(_) => ErrorKind::Unavailable,
        }
    }
}
