use crate::checkout::meets_minimum_deposit;
use crate::model::{
    generate_order_number, line_code_key, open_order_key, CustomerId, LineAppend, LineId, Order,
    OrderCreate, OrderId, OrderLine, OrderStatus, SessionId,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, OrderTransition, OrderUpdate};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, Query, ResourceClient, Upserted};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// One customer's not-yet-confirmed orders of a session, summed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEntry {
    pub customer_id: CustomerId,
    pub order_ids: Vec<OrderId>,
    pub total_quantity: u64,
    pub subtotal: f64,
    pub deposit: f64,
    /// Deposit covers at least half of the subtotal.
    pub can_finalize: bool,
}

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// The `CREATED` order of (session, customer), created with a fresh number if missing.
    #[instrument(skip(self))]
    pub async fn open_order_for(
        &self,
        session_id: SessionId,
        customer_id: CustomerId,
        number_prefix: &str,
    ) -> Result<Upserted<Order>, OrderError> {
        let upserted = self
            .inner
            .upsert(
                open_order_key(session_id, customer_id),
                OrderCreate {
                    session_id,
                    customer_id,
                    number: generate_order_number(number_prefix),
                },
            )
            .await
            .map_err(Self::map_error)?;
        if upserted.created {
            info!(order_id = %upserted.item.id, number = %upserted.item.number, "Order opened");
        }
        Ok(upserted)
    }

    #[instrument(skip(self))]
    pub async fn find_open_order(
        &self,
        session_id: SessionId,
        customer_id: CustomerId,
    ) -> Result<Option<Order>, OrderError> {
        self.inner
            .lookup(open_order_key(session_id, customer_id))
            .await
            .map_err(Self::map_error)
    }

    /// The order whose live-session line carries `code`, if any.
    #[instrument(skip(self))]
    pub async fn code_holder(
        &self,
        session_id: SessionId,
        code: &str,
    ) -> Result<Option<Order>, OrderError> {
        self.inner
            .lookup(line_code_key(session_id, code))
            .await
            .map_err(Self::map_error)
    }

    pub async fn code_in_use(&self, session_id: SessionId, code: &str) -> Result<bool, OrderError> {
        Ok(self.code_holder(session_id, code).await?.is_some())
    }

    #[instrument(skip(self))]
    pub async fn append_line(&self, id: OrderId, line: LineAppend) -> Result<OrderLine, OrderError> {
        debug!("Sending request");
        match self.act(id, OrderAction::AppendLine(line)).await? {
            OrderActionResult::AppendLine(line) => Ok(line),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn merge_line(
        &self,
        id: OrderId,
        line_id: LineId,
        quantity: u32,
    ) -> Result<OrderLine, OrderError> {
        debug!("Sending request");
        match self.act(id, OrderAction::MergeLine { line_id, quantity }).await? {
            OrderActionResult::MergeLine(line) => Ok(line),
            other => Err(unexpected(other)),
        }
    }

    /// Moves a `CREATED` order into checkout. Returns whether the status changed.
    #[instrument(skip(self))]
    pub async fn begin_checkout(&self, id: OrderId) -> Result<bool, OrderError> {
        match self.act(id, OrderAction::BeginCheckout).await? {
            OrderActionResult::BeginCheckout(changed) => Ok(changed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn update_field(&self, id: OrderId, update: OrderUpdate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Confirms the order provided it is still at `revision`.
    #[instrument(skip(self))]
    pub async fn confirm(&self, id: OrderId, revision: u64) -> Result<OrderStatus, OrderError> {
        match self.act(id, OrderAction::Confirm { revision }).await? {
            OrderActionResult::Confirm(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    pub async fn start_preparation(&self, id: OrderId) -> Result<OrderStatus, OrderError> {
        self.transition(id, OrderTransition::StartPreparation).await
    }

    pub async fn mark_delivered(&self, id: OrderId) -> Result<OrderStatus, OrderError> {
        self.transition(id, OrderTransition::Deliver).await
    }

    pub async fn cancel(&self, id: OrderId) -> Result<OrderStatus, OrderError> {
        self.transition(id, OrderTransition::Cancel).await
    }

    #[instrument(skip(self))]
    async fn transition(&self, id: OrderId, step: OrderTransition) -> Result<OrderStatus, OrderError> {
        match self.act(id, OrderAction::Transition(step)).await? {
            OrderActionResult::Transition(status) => {
                info!(order_id = %id, %status, "Order moved");
                Ok(status)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Orders of a session in creation order.
    #[instrument(skip(self))]
    pub async fn session_orders(&self, session_id: SessionId) -> Result<Vec<Order>, OrderError> {
        self.find(Query::new().filter(move |o: &Order| o.session_id == session_id))
            .await
    }

    /// Orders of a customer, newest first.
    #[instrument(skip(self))]
    pub async fn customer_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        self.find(
            Query::new()
                .filter(move |o: &Order| o.customer_id == customer_id)
                .order_by(|a: &Order, b: &Order| b.created_at.cmp(&a.created_at)),
        )
        .await
    }

    /// Per-customer totals of the session's orders not yet confirmed, highest subtotal first.
    ///
    /// Orders without lines are left out.
    #[instrument(skip(self))]
    pub async fn pending_summary(&self, session_id: SessionId) -> Result<Vec<PendingEntry>, OrderError> {
        let orders = self
            .find(Query::new().filter(move |o: &Order| {
                o.session_id == session_id && o.status.is_editable() && !o.lines.is_empty()
            }))
            .await?;

        let mut by_customer: BTreeMap<CustomerId, PendingEntry> = BTreeMap::new();
        for order in &orders {
            let entry = by_customer
                .entry(order.customer_id)
                .or_insert_with(|| PendingEntry {
                    customer_id: order.customer_id,
                    order_ids: Vec::new(),
                    total_quantity: 0,
                    subtotal: 0.0,
                    deposit: 0.0,
                    can_finalize: false,
                });
            entry.order_ids.push(order.id);
            entry.total_quantity += order.total_quantity();
            entry.subtotal += order.total();
            entry.deposit += order.payment.deposit;
        }

        let mut entries: Vec<PendingEntry> = by_customer
            .into_values()
            .map(|mut entry| {
                entry.can_finalize = meets_minimum_deposit(entry.deposit, entry.subtotal);
                entry
            })
            .collect();
        entries.sort_by(|a, b| b.subtotal.total_cmp(&a.subtotal));
        Ok(entries)
    }

    /// Confirmed orders ready for the preparation stage, most recently updated first.
    #[instrument(skip(self))]
    pub async fn confirmed_feed(&self) -> Result<Vec<Order>, OrderError> {
        self.find(
            Query::new()
                .filter(|o: &Order| {
                    o.status == OrderStatus::Confirmed && !o.lines.is_empty() && o.total() > 0.0
                })
                .order_by(|a: &Order, b: &Order| b.updated_at.cmp(&a.updated_at)),
        )
        .await
    }

    /// Like `get`, but a missing row is an error.
    pub async fn require(&self, id: OrderId) -> Result<Order, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    async fn act(&self, id: OrderId, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("unexpected action result {result:?}"))
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::UniqueViolation(key) => OrderError::UniqueViolation(key),
            other => other
                .downcast_entity::<OrderError>()
                .unwrap_or_else(|e| OrderError::ActorCommunicationError(e.to_string())),
        }
    }
}
