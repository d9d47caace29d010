//! Order status transitions.
//!
//! ```text
//! CREATED -> CHECKOUT_IN_PROGRESS -> CONFIRMED -> IN_PREPARATION -> DELIVERED
//!    \______________\___________________\______________\___________-> CANCELLED
//! ```
//!
//! Status only moves forward. `DELIVERED` and `CANCELLED` are terminal.

use crate::error::Precondition;
use crate::model::{Order, OrderStatus};

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use crate::model::OrderStatus::*;
    match (from, to) {
        (Created, CheckoutInProgress)
        | (CheckoutInProgress, Confirmed)
        | (Confirmed, InPreparation)
        | (InPreparation, Delivered) => true,
        (from, Cancelled) => !from.is_terminal(),
        _ => false,
    }
}

/// Moves `order` to `to`, or names the violated rule.
pub fn transition(order: &mut Order, to: OrderStatus) -> Result<(), Precondition> {
    if !can_transition(order.status, to) {
        return Err(Precondition::IllegalTransition {
            from: order.status,
            to,
        });
    }
    order.status = to;
    Ok(())
}
