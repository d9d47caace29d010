use super::readiness::{
    allowed_payment_methods, completion_step, compute_readiness, is_fully_paid, Readiness,
};
use crate::clients::{ContactClient, CustomerClient, OrderClient};
use crate::contact_actor::ContactError;
use crate::customer_actor::CustomerError;
use crate::error::{ErrorKind, Precondition};
use crate::model::{
    ContactEntry, ContactKind, Customer, CustomerUpdate, DeliveryMode, Order, OrderId,
    OrderStatus, PaymentMethod,
};
use crate::order_actor::{OrderError, OrderUpdate};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Everything the checkout form shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutContext {
    pub order: Order,
    pub customer: Customer,
    /// Primary first.
    pub contacts: Vec<ContactEntry>,
    pub readiness: Readiness,
}

impl CheckoutContext {
    pub fn total(&self) -> f64 {
        self.order.total()
    }

    pub fn is_fully_paid(&self) -> bool {
        is_fully_paid(&self.order)
    }

    pub fn completion_step(&self) -> u8 {
        completion_step(&self.order, &self.customer, &self.contacts)
    }

    pub fn allowed_payment_methods(&self) -> &'static [PaymentMethod] {
        allowed_payment_methods(self.order.delivery.is_province)
    }
}

/// Which form field an edit targets. Pending edits are coalesced per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    RealName,
    Phone,
    Address,
    DeliveryMode,
    DeliveryDate,
    Province,
    Transport,
    PaymentMethod,
    PaymentReference,
    Deposit,
    Paid,
}

/// One checkout form edit with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutEdit {
    RealName(String),
    /// Recorded (or reused) and made the primary phone.
    Phone(String),
    /// Recorded (or reused) and made the primary address.
    Address(String),
    DeliveryMode(Option<DeliveryMode>),
    DeliveryDate(Option<NaiveDate>),
    Province(bool),
    Transport(String),
    PaymentMethod(Option<PaymentMethod>),
    PaymentReference(String),
    Deposit(f64),
    /// The "paid" checkbox: deposit set to the total, or back to zero.
    Paid(bool),
}

impl CheckoutEdit {
    pub fn field(&self) -> CheckoutField {
        match self {
            CheckoutEdit::RealName(_) => CheckoutField::RealName,
            CheckoutEdit::Phone(_) => CheckoutField::Phone,
            CheckoutEdit::Address(_) => CheckoutField::Address,
            CheckoutEdit::DeliveryMode(_) => CheckoutField::DeliveryMode,
            CheckoutEdit::DeliveryDate(_) => CheckoutField::DeliveryDate,
            CheckoutEdit::Province(_) => CheckoutField::Province,
            CheckoutEdit::Transport(_) => CheckoutField::Transport,
            CheckoutEdit::PaymentMethod(_) => CheckoutField::PaymentMethod,
            CheckoutEdit::PaymentReference(_) => CheckoutField::PaymentReference,
            CheckoutEdit::Deposit(_) => CheckoutField::Deposit,
            CheckoutEdit::Paid(_) => CheckoutField::Paid,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error(transparent)]
    Contact(#[from] ContactError),

    #[error(transparent)]
    Precondition(#[from] Precondition),
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Order(e) => e.kind(),
            CheckoutError::Customer(e) => e.kind(),
            CheckoutError::Contact(e) => e.kind(),
            CheckoutError::Precondition(_) => ErrorKind::PreconditionFailed,
        }
    }

    /// The store was unreachable; the same edit may succeed later.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    /// Missing fields when finalization was refused for them.
    pub fn missing_fields(&self) -> Option<&[crate::model::FieldId]> {
        match self {
            CheckoutError::Precondition(Precondition::MissingFields(fields)) => Some(fields),
            _ => None,
        }
    }
}

/// Checkout operations exposed to the UI.
#[derive(Clone)]
pub struct CheckoutService {
    customers: CustomerClient,
    contacts: ContactClient,
    orders: OrderClient,
}

impl CheckoutService {
    pub fn new(customers: CustomerClient, contacts: ContactClient, orders: OrderClient) -> Self {
        Self {
            customers,
            contacts,
            orders,
        }
    }

    /// Loads the order with its customer and contacts.
    ///
    /// Opening the checkout moves a `CREATED` order to `CHECKOUT_IN_PROGRESS`, so no more
    /// lines are captured into it.
    #[instrument(skip(self))]
    pub async fn load_checkout_context(&self, order_id: OrderId) -> Result<CheckoutContext, CheckoutError> {
        if self.orders.begin_checkout(order_id).await? {
            info!(%order_id, "Checkout started");
        }
        let order = self.orders.require(order_id).await?;
        let customer = self.customers.require(order.customer_id).await?;
        let contacts = self.contacts.contacts(customer.id).await?;
        let readiness = compute_readiness(&order, &customer, &contacts);
        Ok(CheckoutContext {
            order,
            customer,
            contacts,
            readiness,
        })
    }

    /// Applies one edit. Every edit is refused once the order is confirmed.
    #[instrument(skip(self))]
    pub async fn update_checkout_field(
        &self,
        order_id: OrderId,
        edit: CheckoutEdit,
    ) -> Result<(), CheckoutError> {
        let update = match edit {
            CheckoutEdit::RealName(name) => {
                let order = self.editable(order_id).await?;
                self.customers
                    .update_profile(
                        order.customer_id,
                        CustomerUpdate {
                            real_name: Some(name),
                            ..Default::default()
                        },
                    )
                    .await?;
                return Ok(());
            }
            CheckoutEdit::Phone(value) => {
                return self.set_contact(order_id, ContactKind::Phone, &value).await;
            }
            CheckoutEdit::Address(value) => {
                return self.set_contact(order_id, ContactKind::Address, &value).await;
            }
            CheckoutEdit::DeliveryMode(mode) => OrderUpdate::DeliveryMode(mode),
            CheckoutEdit::DeliveryDate(date) => OrderUpdate::DeliveryDate(date),
            CheckoutEdit::Province(is_province) => OrderUpdate::Province(is_province),
            CheckoutEdit::Transport(transport) => OrderUpdate::Transport(Some(transport)),
            CheckoutEdit::PaymentMethod(method) => OrderUpdate::PaymentMethod(method),
            CheckoutEdit::PaymentReference(reference) => {
                OrderUpdate::PaymentReference(Some(reference))
            }
            CheckoutEdit::Deposit(amount) => OrderUpdate::Deposit(amount),
            CheckoutEdit::Paid(paid) => OrderUpdate::FullyPaid(paid),
        };
        let order = self.orders.update_field(order_id, update).await?;
        debug!(%order_id, revision = order.revision, "Checkout field saved");
        Ok(())
    }

    /// Confirms the order if every checkout rule holds.
    ///
    /// Refused with the full list of missing fields otherwise, or when the order changed
    /// between the check and the confirmation.
    #[instrument(skip(self))]
    pub async fn finalize_checkout(&self, order_id: OrderId) -> Result<Order, CheckoutError> {
        let context = self.load_checkout_context(order_id).await?;
        if context.order.status != OrderStatus::CheckoutInProgress {
            return Err(Precondition::IllegalTransition {
                from: context.order.status,
                to: OrderStatus::Confirmed,
            }
            .into());
        }
        if !context.readiness.can_finalize {
            return Err(Precondition::MissingFields(context.readiness.missing_fields).into());
        }
        self.orders
            .confirm(order_id, context.order.revision)
            .await?;
        info!(%order_id, number = %context.order.number, "Order confirmed");
        Ok(self.orders.require(order_id).await?)
    }

    /// Customer-side edits live in other tables, so the order's status is checked here.
    async fn editable(&self, order_id: OrderId) -> Result<Order, CheckoutError> {
        let order = self.orders.require(order_id).await?;
        if !order.status.is_editable() {
            return Err(Precondition::ReadOnly {
                status: order.status,
            }
            .into());
        }
        Ok(order)
    }

    async fn set_contact(
        &self,
        order_id: OrderId,
        kind: ContactKind,
        value: &str,
    ) -> Result<(), CheckoutError> {
        let order = self.editable(order_id).await?;
        let entry = self
            .contacts
            .add_or_reuse(order.customer_id, kind, value, true)
            .await?;
        debug!(%order_id, entry_id = %entry.id, %kind, "Primary contact set");
        Ok(())
    }
}
