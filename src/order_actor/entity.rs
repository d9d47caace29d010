//! Entity trait implementation for the Order domain type.
//!
//! Every write bumps `revision` and `updated_at`. Checkout field edits are refused once the
//! order left the editable statuses; line writes are refused once it left `CREATED`.

use super::actions::{OrderAction, OrderActionResult, OrderUpdate};
use super::lifecycle::transition;
use super::OrderError;
use crate::error::Precondition;
use crate::model::{
    clean_name, line_code_key, open_order_key, order_number_key, LineAppend, LineId, Order,
    OrderCreate, OrderId, OrderLine, OrderStatus, PaymentMethod,
};
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::ActorEntity;
use tracing::debug;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        let number = clean_name(&params.number).ok_or(OrderError::MissingField("order number"))?;
        let now = Utc::now();
        Ok(Self {
            id,
            number,
            session_id: params.session_id,
            customer_id: params.customer_id,
            status: OrderStatus::Created,
            delivery: Default::default(),
            payment: Default::default(),
            lines: Vec::new(),
            next_line_id: 1,
            revision: 0,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_keys(&self) -> Vec<String> {
        let mut keys = vec![order_number_key(&self.number)];
        if self.status == OrderStatus::Created {
            keys.push(open_order_key(self.session_id, self.customer_id));
        }
        keys.extend(
            self.lines
                .iter()
                .filter(|line| line.code_reserved)
                .map(|line| line_code_key(self.session_id, &line.code)),
        );
        keys
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if !self.status.is_editable() {
            return Err(Precondition::ReadOnly {
                status: self.status,
            }
            .into());
        }

        match update {
            OrderUpdate::DeliveryMode(mode) => self.delivery.mode = mode,
            OrderUpdate::DeliveryDate(date) => self.delivery.date = date,
            OrderUpdate::Province(is_province) => {
                self.delivery.is_province = is_province;
                if is_province && self.payment.method == Some(PaymentMethod::Cash) {
                    debug!(order_id = %self.id, "Cash cleared for province order");
                    self.payment.method = None;
                }
            }
            OrderUpdate::Transport(transport) => {
                self.delivery.transport = transport.as_deref().and_then(clean_name);
            }
            OrderUpdate::PaymentMethod(method) => {
                if method == Some(PaymentMethod::Cash) && self.delivery.is_province {
                    return Err(OrderError::CashNotAllowedForProvince);
                }
                self.payment.method = method;
            }
            OrderUpdate::PaymentReference(reference) => {
                self.payment.reference = reference.as_deref().and_then(clean_name);
            }
            OrderUpdate::Deposit(deposit) => {
                if !deposit.is_finite() || deposit < 0.0 {
                    return Err(OrderError::InvalidAmount(format!("deposit {deposit}")));
                }
                let total = self.total();
                if deposit > total {
                    return Err(OrderError::DepositExceedsTotal { deposit, total });
                }
                self.payment.deposit = deposit;
            }
            OrderUpdate::FullyPaid(paid) => {
                self.payment.deposit = if paid { self.total() } else { 0.0 };
            }
        }

        self.touch();
        Ok(())
    }

    /// Lines may only be removed together with the order, so only empty orders go.
    async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
        if !self.lines.is_empty() {
            return Err(OrderError::NotEmpty(self.lines.len()));
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &(),
    ) -> Result<OrderActionResult, Self::Error> {
        let result = match action {
            OrderAction::AppendLine(line) => OrderActionResult::AppendLine(self.append(line)?),
            OrderAction::MergeLine { line_id, quantity } => {
                OrderActionResult::MergeLine(self.merge(line_id, quantity)?)
            }
            OrderAction::BeginCheckout => {
                if self.status != OrderStatus::Created {
                    return Ok(OrderActionResult::BeginCheckout(false));
                }
                transition(self, OrderStatus::CheckoutInProgress)?;
                OrderActionResult::BeginCheckout(true)
            }
            OrderAction::Confirm { revision } => {
                if revision != self.revision {
                    return Err(Precondition::StaleSnapshot {
                        expected: revision,
                        actual: self.revision,
                    }
                    .into());
                }
                if self.lines.is_empty() {
                    return Err(Precondition::EmptyOrder.into());
                }
                transition(self, OrderStatus::Confirmed)?;
                OrderActionResult::Confirm(self.status)
            }
            OrderAction::Transition(step) => {
                transition(self, step.target())?;
                OrderActionResult::Transition(self.status)
            }
        };

        self.touch();
        Ok(result)
    }
}

impl Order {
    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    fn ensure_lines_open(&self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Created {
            return Err(Precondition::LinesLocked {
                status: self.status,
            }
            .into());
        }
        Ok(())
    }

    fn append(&mut self, line: LineAppend) -> Result<OrderLine, OrderError> {
        self.ensure_lines_open()?;
        let code = clean_name(&line.code).ok_or(OrderError::MissingField("code"))?;
        let description =
            clean_name(&line.description).ok_or(OrderError::MissingField("description"))?;
        if !line.unit_price.is_finite() || line.unit_price < 0.0 {
            return Err(OrderError::InvalidAmount(format!(
                "unit price {}",
                line.unit_price
            )));
        }
        if line.quantity == 0 {
            return Err(OrderError::InvalidAmount("quantity 0".to_string()));
        }

        let mut created = OrderLine {
            id: LineId(self.next_line_id),
            order_id: self.id,
            code,
            description,
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: 0.0,
            code_reserved: line.reserve_code,
        };
        created.recompute_total();
        self.next_line_id += 1;
        self.lines.push(created.clone());
        Ok(created)
    }

    fn merge(&mut self, line_id: LineId, quantity: u32) -> Result<OrderLine, OrderError> {
        self.ensure_lines_open()?;
        if quantity == 0 {
            return Err(OrderError::InvalidAmount("quantity 0".to_string()));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or(OrderError::UnknownLine(line_id))?;
        line.quantity = line
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| OrderError::InvalidAmount(format!("quantity overflow on {line_id}")))?;
        line.recompute_total();
        Ok(line.clone())
    }
}
