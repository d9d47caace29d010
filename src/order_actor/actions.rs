//! Custom actions for the Order actor.
//!
//! Field edits go through [`OrderUpdate`]; everything that touches lines or status is an
//! action so it runs as one conditional write.

use crate::model::{
    DeliveryMode, LineAppend, LineId, OrderLine, OrderStatus, PaymentMethod,
};
use chrono::NaiveDate;

/// A single checkout field edit. Rejected once the order is read-only.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderUpdate {
    DeliveryMode(Option<DeliveryMode>),
    DeliveryDate(Option<NaiveDate>),
    /// Turning the province flag on also clears a cash payment method.
    Province(bool),
    Transport(Option<String>),
    PaymentMethod(Option<PaymentMethod>),
    PaymentReference(Option<String>),
    Deposit(f64),
    /// Sets the deposit to the total (`true`) or to zero (`false`).
    FullyPaid(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTransition {
    StartPreparation,
    Deliver,
    Cancel,
}

impl OrderTransition {
    pub fn target(self) -> OrderStatus {
        match self {
            OrderTransition::StartPreparation => OrderStatus::InPreparation,
            OrderTransition::Deliver => OrderStatus::Delivered,
            OrderTransition::Cancel => OrderStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Appends a line. Only while `CREATED`.
    AppendLine(LineAppend),
    /// Adds `quantity` to an existing line, keeping its unit price. Only while `CREATED`.
    MergeLine { line_id: LineId, quantity: u32 },
    /// `CREATED` to `CHECKOUT_IN_PROGRESS`; a no-op in any other status.
    BeginCheckout,
    /// `CHECKOUT_IN_PROGRESS` to `CONFIRMED`, provided nothing changed since `revision`.
    Confirm { revision: u64 },
    Transition(OrderTransition),
}

/// Results from OrderActions, one variant per action.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    AppendLine(OrderLine),
    MergeLine(OrderLine),
    /// Whether the status changed.
    BeginCheckout(bool),
    Confirm(OrderStatus),
    Transition(OrderStatus),
}
