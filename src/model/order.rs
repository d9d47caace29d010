//! Orders and their lines.
//!
//! An order is created by the reconciler the first time a line is captured for a
//! (session, customer) pair, collects lines while `CREATED`, then goes through checkout and the
//! fulfillment stages. Totals are always derived from the lines, never stored.
use crate::model::{CustomerId, SessionId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Identifier of a line, unique within its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

impl Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line_{}", self.0)
    }
}

/// Fulfillment status. Transitions are listed in
/// [`order_actor::lifecycle`](crate::order_actor::lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    CheckoutInProgress,
    Confirmed,
    InPreparation,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Checkout fields may only change before confirmation.
    pub fn is_editable(self) -> bool {
        matches!(self, OrderStatus::Created | OrderStatus::CheckoutInProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::CheckoutInProgress => "CHECKOUT_IN_PROGRESS",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::InPreparation => "IN_PREPARATION",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryMode {
    Pickup,
    CarrierDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "mvola")]
    MVola,
    OrangeMoney,
    AirtelMoney,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::MVola,
        PaymentMethod::OrangeMoney,
        PaymentMethod::AirtelMoney,
    ];

    pub const MOBILE_MONEY: [PaymentMethod; 3] = [
        PaymentMethod::MVola,
        PaymentMethod::OrangeMoney,
        PaymentMethod::AirtelMoney,
    ];

    pub fn is_mobile_money(self) -> bool {
        self != PaymentMethod::Cash
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::MVola => "mvola",
            PaymentMethod::OrangeMoney => "orange_money",
            PaymentMethod::AirtelMoney => "airtel_money",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub mode: Option<DeliveryMode>,
    pub date: Option<NaiveDate>,
    /// Out-of-town delivery through a carrier; stricter payment rules apply.
    pub is_province: bool,
    pub transport: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
    pub deposit: f64,
}

/// One captured item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: LineId,
    pub order_id: OrderId,
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
    /// Set for lines captured in a live session, whose codes are unique per session.
    pub code_reserved: bool,
}

impl OrderLine {
    pub fn recompute_total(&mut self) {
        self.line_total = self.unit_price * f64::from(self.quantity);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub session_id: SessionId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub delivery: Delivery,
    pub payment: Payment,
    pub lines: Vec<OrderLine>,
    pub next_line_id: u32,
    /// Bumped by every write; used to detect a stale snapshot at confirmation.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub session_id: SessionId,
    pub customer_id: CustomerId,
    pub number: String,
}

/// A validated line ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAppend {
    pub code: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub reserve_code: bool,
}

impl Order {
    /// Sum of the line totals.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|line| line.line_total).sum()
    }

    /// Widened: line quantities are `u32`, their sum may not fit.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// What is still owed after the deposit.
    pub fn remaining(&self) -> f64 {
        (self.total() - self.payment.deposit).max(0.0)
    }

    /// Line with exactly this code (case-sensitive) and description.
    pub fn find_line(&self, code: &str, description: &str) -> Option<&OrderLine> {
        self.lines
            .iter()
            .find(|line| line.code == code && line.description == description)
    }

    pub fn line(&self, id: LineId) -> Option<&OrderLine> {
        self.lines.iter().find(|line| line.id == id)
    }
}

/// Key held by the one `CREATED` order of a (session, customer) pair.
pub fn open_order_key(session_id: SessionId, customer_id: CustomerId) -> String {
    format!("open-order:{}:{}", session_id.0, customer_id.0)
}

/// Key held by a reserved line code within a session.
pub fn line_code_key(session_id: SessionId, code: &str) -> String {
    format!("{}{}:{}", LINE_CODE_KEY_PREFIX, session_id.0, code)
}

pub const LINE_CODE_KEY_PREFIX: &str = "line-code:";

pub fn order_number_key(number: &str) -> String {
    format!("order-number:{number}")
}

/// Fresh human-shareable order number, e.g. `CMD-1760700000000-4F9A1C2B7`.
pub fn generate_order_number(prefix: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        random[..9].to_uppercase()
    )
}
