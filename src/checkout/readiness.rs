//! Pure checkout predicates.
//!
//! Two independent readiness notions exist: the full checkout form uses
//! [`compute_readiness`], the pending view uses the looser [`can_finalize_pending`].

use crate::model::{
    primary_of, ContactEntry, ContactKind, Customer, FieldId, Order, PaymentMethod,
};
use serde::Serialize;

/// Share of the total the pending view wants covered by the deposit.
pub const MIN_DEPOSIT_RATIO: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Every failing rule, in evaluation order.
    pub missing_fields: Vec<FieldId>,
    pub can_finalize: bool,
}

/// Checks every checkout rule and reports all failures, not just the first.
pub fn compute_readiness(order: &Order, customer: &Customer, contacts: &[ContactEntry]) -> Readiness {
    let mut missing = Vec::new();
    let delivery = &order.delivery;
    let payment = &order.payment;
    let deposit = payment.deposit;
    let has_deposit = deposit > 0.0;

    if !customer.has_real_name() {
        missing.push(FieldId::RealName);
    }
    if primary_of(contacts, ContactKind::Phone).is_none() {
        missing.push(FieldId::PrimaryPhone);
    }
    if primary_of(contacts, ContactKind::Address).is_none() {
        missing.push(FieldId::PrimaryAddress);
    }
    if delivery.mode.is_none() {
        missing.push(FieldId::DeliveryMode);
    }
    if delivery.date.is_none() {
        missing.push(FieldId::DeliveryDate);
    }

    let method = payment
        .method
        .filter(|method| allowed_payment_methods(delivery.is_province).contains(method));
    if method.is_none() {
        missing.push(FieldId::PaymentMethod);
    }

    if delivery.is_province {
        let has_transport = delivery
            .transport
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_transport {
            missing.push(FieldId::Transport);
        }
        if !has_deposit {
            missing.push(FieldId::DepositAmount);
        }
    } else if method != Some(PaymentMethod::Cash) && !has_deposit {
        missing.push(FieldId::DepositAmount);
    }

    if method.is_some_and(PaymentMethod::is_mobile_money) {
        let has_reference = payment
            .reference
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty());
        if !has_reference {
            missing.push(FieldId::PaymentReference);
        }
    }

    if deposit > order.total() {
        missing.push(FieldId::DepositExceedsTotal);
    }

    Readiness {
        can_finalize: missing.is_empty(),
        missing_fields: missing,
    }
}

/// Cash is refused for province orders.
pub fn allowed_payment_methods(is_province: bool) -> &'static [PaymentMethod] {
    if is_province {
        &PaymentMethod::MOBILE_MONEY
    } else {
        &PaymentMethod::ALL
    }
}

/// Derived, never stored.
pub fn is_fully_paid(order: &Order) -> bool {
    let total = order.total();
    total > 0.0 && order.payment.deposit == total
}

pub fn meets_minimum_deposit(deposit: f64, total: f64) -> bool {
    total > 0.0 && deposit >= MIN_DEPOSIT_RATIO * total
}

/// The pending view's check: the order has lines and at least half of it is paid.
pub fn can_finalize_pending(order: &Order) -> bool {
    !order.lines.is_empty() && meets_minimum_deposit(order.payment.deposit, order.total())
}

/// How far the checkout form is filled in.
///
/// 0: personal info missing, 1: delivery or payment missing, 2: deposit missing,
/// 3: complete.
pub fn completion_step(order: &Order, customer: &Customer, contacts: &[ContactEntry]) -> u8 {
    let readiness = compute_readiness(order, customer, contacts);
    let missing = |field: FieldId| readiness.missing_fields.contains(&field);

    if readiness.missing_fields.iter().any(|f| f.is_personal()) {
        return 0;
    }
    if missing(FieldId::DeliveryDate)
        || missing(FieldId::DeliveryMode)
        || order.payment.method.is_none()
    {
        return 1;
    }
    if missing(FieldId::DepositAmount) {
        return 2;
    }
    3
}

pub fn remaining_balance(order: &Order) -> f64 {
    order.remaining()
}
