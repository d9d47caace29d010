//! Error types for line capture.

use crate::contact_actor::ContactError;
use crate::customer_actor::CustomerError;
use crate::error::ErrorKind;
use crate::model::SessionId;
use crate::order_actor::OrderError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    /// The code is already used by a line of this live session.
    #[error("Code {code} already used in {session_id}")]
    DuplicateCode { session_id: SessionId, code: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Description is required")]
    MissingDescription,

    #[error("Phone number is required")]
    MissingPhone,

    #[error("No article to capture")]
    NoArticles,

    #[error("{0} is not a regular sale session")]
    NotRegularSession(SessionId),

    #[error("Capture aborted by operator")]
    Aborted,

    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl CaptureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::DuplicateCode { .. } => ErrorKind::DuplicateCode,
            CaptureError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            CaptureError::MissingDescription
            | CaptureError::MissingPhone
            | CaptureError::NoArticles => ErrorKind::Validation,
            CaptureError::NotRegularSession(_) => ErrorKind::PreconditionFailed,
            CaptureError::Aborted => ErrorKind::Aborted,
            CaptureError::Customer(e) => e.kind(),
            CaptureError::Contact(e) => e.kind(),
            CaptureError::Order(e) => e.kind(),
        }
    }
}
