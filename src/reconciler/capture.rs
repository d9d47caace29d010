use super::{CaptureError, LineDraft, MergeDecision, MergePrompt, MergeRequest};
use crate::clients::{ContactClient, CustomerClient, OrderClient};
use crate::config::CheckoutConfig;
use crate::customer_actor::CustomerError;
use crate::model::{
    clean_name, CaptureSession, ContactEntry, ContactKind, Customer, CustomerId, OrderId,
    OrderLine, OrderStatus, SessionKind, LINE_CODE_KEY_PREFIX,
};
use crate::order_actor::OrderError;
use resource_actor::ActorClient;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Who a captured line belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureIdentity {
    /// Live-platform handle, from the live quick-entry form.
    Alias(String),
    /// Typed customer name, from the regular-sale form.
    RealName(String),
}

/// Outcome of one captured line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedLine {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    pub line: OrderLine,
    /// The quantity was added to an existing line.
    pub merged: bool,
    /// This capture opened the order.
    pub order_created: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegularSale {
    pub customer: Customer,
    pub phone: ContactEntry,
    pub lines: Vec<CapturedLine>,
}

/// Turns captured lines into order lines.
///
/// For each line: resolve the customer, reuse or open the (session, customer) order still in
/// `CREATED`, then merge into a matching line (after asking the [`MergePrompt`]) or append.
pub struct OrderLineReconciler<P> {
    customers: CustomerClient,
    contacts: ContactClient,
    orders: OrderClient,
    prompt: P,
    default_code: String,
    number_prefix: String,
}

impl<P: MergePrompt> OrderLineReconciler<P> {
    pub fn new(
        customers: CustomerClient,
        contacts: ContactClient,
        orders: OrderClient,
        prompt: P,
        config: &CheckoutConfig,
    ) -> Self {
        Self {
            customers,
            contacts,
            orders,
            prompt,
            default_code: config.default_code.clone(),
            number_prefix: config.order_prefix.clone(),
        }
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Captures one line into `session`.
    ///
    /// In a live session the code must not be used by any other line of the session; the
    /// only accepted reuse is the customer's own matching line, which is offered for merging.
    #[instrument(skip(self, session), fields(session_id = %session.session_id))]
    pub async fn capture_line(
        &self,
        session: &CaptureSession,
        identity: &CaptureIdentity,
        draft: &LineDraft,
    ) -> Result<CapturedLine, CaptureError> {
        let draft = draft.normalized(&self.default_code)?;
        if session.kind == SessionKind::Live {
            self.check_code(session, identity, &draft).await?;
        }
        let customer = self.resolve(identity).await?;
        self.capture_for(session, &customer, &draft).await
    }

    /// Captures a regular (non-live) sale: one customer, a phone number, several articles.
    ///
    /// Every article is checked before anything is written.
    #[instrument(skip(self, session, articles), fields(session_id = %session.session_id, articles = articles.len()))]
    pub async fn capture_regular_sale(
        &self,
        session: &CaptureSession,
        customer_name: &str,
        phone: &str,
        articles: &[LineDraft],
    ) -> Result<RegularSale, CaptureError> {
        if session.kind != SessionKind::Regular {
            return Err(CaptureError::NotRegularSession(session.session_id));
        }
        let name = clean_name(customer_name).ok_or(CustomerError::EmptyName)?;
        let phone = clean_name(phone).ok_or(CaptureError::MissingPhone)?;
        let drafts = articles
            .iter()
            .map(|article| {
                let draft = article.normalized(&self.default_code)?;
                draft.require_priced()?;
                Ok(draft)
            })
            .collect::<Result<Vec<_>, CaptureError>>()?;
        if drafts.is_empty() {
            return Err(CaptureError::NoArticles);
        }

        let customer = self.customers.resolve_or_create_by_real_name(&name).await?;
        let phone = self
            .contacts
            .add_or_reuse(customer.id, ContactKind::Phone, &phone, false)
            .await?;

        let mut lines = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            lines.push(self.capture_for(session, &customer, draft).await?);
        }
        info!(customer_id = %customer.id, lines = lines.len(), "Regular sale captured");
        Ok(RegularSale {
            customer,
            phone,
            lines,
        })
    }

    async fn resolve(&self, identity: &CaptureIdentity) -> Result<Customer, CaptureError> {
        let customer = match identity {
            CaptureIdentity::Alias(alias) => self.customers.resolve_or_create_by_alias(alias).await?,
            CaptureIdentity::RealName(name) => {
                self.customers.resolve_or_create_by_real_name(name).await?
            }
        };
        Ok(customer)
    }

    /// Read-only check run before any write of a live capture.
    async fn check_code(
        &self,
        session: &CaptureSession,
        identity: &CaptureIdentity,
        draft: &LineDraft,
    ) -> Result<(), CaptureError> {
        let Some(holder) = self.orders.code_holder(session.session_id, &draft.code).await? else {
            return Ok(());
        };
        let own = match identity {
            CaptureIdentity::Alias(alias) => self
                .customers
                .find_by_alias(alias)
                .await?
                .is_some_and(|customer| customer.id == holder.customer_id),
            CaptureIdentity::RealName(_) => false,
        };
        if own
            && holder.status == OrderStatus::Created
            && holder.find_line(&draft.code, &draft.description).is_some()
        {
            return Ok(());
        }
        debug!(code = %draft.code, holder = %holder.id, "Code already used");
        Err(duplicate_code(session, draft))
    }

    async fn capture_for(
        &self,
        session: &CaptureSession,
        customer: &Customer,
        draft: &LineDraft,
    ) -> Result<CapturedLine, CaptureError> {
        let live = session.kind == SessionKind::Live;
        let opened = self
            .orders
            .open_order_for(session.session_id, customer.id, &self.number_prefix)
            .await?;
        let order = opened.item;

        if let Some(existing) = order.find_line(&draft.code, &draft.description) {
            let request = MergeRequest {
                order_id: order.id,
                order_number: order.number.clone(),
                existing: existing.clone(),
                quantity: draft.quantity,
                unit_price: draft.unit_price,
            };
            let decision = self.prompt.decide(&request).await;
            debug!(order_id = %order.id, ?decision, "Merge decision");
            match decision {
                MergeDecision::Merge => {
                    let line = self
                        .orders
                        .merge_line(order.id, existing.id, draft.quantity)
                        .await?;
                    return Ok(CapturedLine {
                        order_id: order.id,
                        order_number: order.number,
                        customer_id: customer.id,
                        line,
                        merged: true,
                        order_created: false,
                    });
                }
                MergeDecision::Abort => return Err(CaptureError::Aborted),
                // a second line with the same code would break session-wide code uniqueness
                MergeDecision::Duplicate if live => return Err(duplicate_code(session, draft)),
                MergeDecision::Duplicate => {}
            }
        }

        match self.orders.append_line(order.id, draft.to_append(live)).await {
            Ok(line) => {
                info!(order_id = %order.id, line_id = %line.id, code = %line.code, "Line captured");
                Ok(CapturedLine {
                    order_id: order.id,
                    order_number: order.number,
                    customer_id: customer.id,
                    line,
                    merged: false,
                    order_created: opened.created,
                })
            }
            Err(e) => {
                if opened.created {
                    self.discard_empty(order.id).await;
                }
                Err(match e {
                    OrderError::UniqueViolation(key) if key.starts_with(LINE_CODE_KEY_PREFIX) => {
                        duplicate_code(session, draft)
                    }
                    other => other.into(),
                })
            }
        }
    }

    /// Best-effort removal of an order this capture opened but could not fill.
    async fn discard_empty(&self, order_id: OrderId) {
        match self.orders.delete(order_id).await {
            Ok(()) => debug!(%order_id, "Discarded empty order"),
            Err(e) => warn!(%order_id, error = %e, "Could not discard empty order"),
        }
    }
}

fn duplicate_code(session: &CaptureSession, draft: &LineDraft) -> CaptureError {
    CaptureError::DuplicateCode {
        session_id: session.session_id,
        code: draft.code.clone(),
    }
}
