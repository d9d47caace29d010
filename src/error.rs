//! Error taxonomy shared by every table and service.
//!
//! Each table has its own error enum (`CustomerError`, `OrderError`, ...) and each service
//! its own (`CaptureError`, `CheckoutError`). All of them report an [`ErrorKind`] so callers
//! can branch on the class of failure without matching every variant.

use crate::model::{join_fields, FieldId, OrderStatus, SessionId};
use serde::Serialize;
use std::fmt::Display;

/// Class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A line code already used in the session.
    DuplicateCode,
    /// Non-numeric, non-positive or non-finite price, quantity or amount.
    InvalidAmount,
    NotFound,
    /// A uniqueness or primary-contact rule would be broken.
    Conflict,
    /// One or more fields missing or invalid.
    Validation,
    /// An illegal transition or an edit of a read-only order.
    PreconditionFailed,
    /// The operator dismissed the merge prompt.
    Aborted,
    /// The store could not be reached.
    Unavailable,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The rule a `PreconditionFailed` error violated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Precondition {
    #[error("order is read-only once {status}")]
    ReadOnly { status: OrderStatus },

    #[error("lines can only change while the order is CREATED (currently {status})")]
    LinesLocked { status: OrderStatus },

    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("checkout incomplete: {}", join_fields(.0))]
    MissingFields(Vec<FieldId>),

    #[error("order has no lines")]
    EmptyOrder,

    #[error("order changed while confirming (read revision {expected}, now {actual})")]
    StaleSnapshot { expected: u64, actual: u64 },

    #[error("{0} is closed")]
    SessionClosed(SessionId),

    #[error("customer still has {0} order(s)")]
    CustomerHasOrders(usize),
}
