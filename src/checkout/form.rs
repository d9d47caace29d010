//! Debounced saving for the checkout form.
//!
//! Edits are held in memory and written once the operator has been idle for the configured
//! delay. Only the latest edit of each field is kept, so a burst of keystrokes becomes one
//! write. [`CheckoutForm::finalize`] cancels the timer and flushes before confirming, so the
//! confirmation always sees the latest edits.

use super::service::{CheckoutEdit, CheckoutError, CheckoutService};
use crate::model::{Order, OrderId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Checkout form state for one order. Cloning shares the state.
///
/// Must be used from within a Tokio runtime: [`edit`](Self::edit) spawns the save timer.
#[derive(Clone)]
pub struct CheckoutForm {
    inner: Arc<FormState>,
}

struct FormState {
    service: CheckoutService,
    order_id: OrderId,
    delay: Duration,
    /// Latest edit per field, in the order the fields were last touched.
    pending: Mutex<Vec<CheckoutEdit>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    /// Serializes flushes so a timer flush and a finalize never interleave.
    write_gate: tokio::sync::Mutex<()>,
    last_error: Mutex<Option<CheckoutError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CheckoutForm {
    pub fn new(service: CheckoutService, order_id: OrderId, delay: Duration) -> Self {
        Self {
            inner: Arc::new(FormState {
                service,
                order_id,
                delay,
                pending: Mutex::new(Vec::new()),
                timer: Mutex::new(None),
                write_gate: tokio::sync::Mutex::new(()),
                last_error: Mutex::new(None),
            }),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.inner.order_id
    }

    /// Queues an edit and restarts the idle timer.
    pub fn edit(&self, edit: CheckoutEdit) {
        {
            let mut pending = lock(&self.inner.pending);
            let field = edit.field();
            pending.retain(|queued| queued.field() != field);
            pending.push(edit);
        }

        let state = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(state.delay).await;
            // detached, so restarting the timer never cancels a write in flight
            tokio::spawn(async move {
                let _ = state.flush().await;
            });
        });
        if let Some(previous) = lock(&self.inner.timer).replace(timer) {
            previous.abort();
        }
    }

    /// Edits not written yet.
    pub fn pending(&self) -> Vec<CheckoutEdit> {
        lock(&self.inner.pending).clone()
    }

    /// Error of the last save, cleared by the next successful one.
    pub fn last_error(&self) -> Option<CheckoutError> {
        lock(&self.inner.last_error).clone()
    }

    /// Writes pending edits now.
    pub async fn flush(&self) -> Result<(), CheckoutError> {
        self.cancel_timer();
        self.inner.flush().await
    }

    /// Flushes pending edits, then confirms the order.
    pub async fn finalize(&self) -> Result<Order, CheckoutError> {
        self.flush().await?;
        self.inner.service.finalize_checkout(self.inner.order_id).await
    }

    fn cancel_timer(&self) {
        if let Some(timer) = lock(&self.inner.timer).take() {
            timer.abort();
        }
    }
}

impl FormState {
    /// Writes every pending edit, keeping the ones that failed for lack of a store.
    ///
    /// Returns the first failure. Rejected edits are dropped.
    async fn flush(&self) -> Result<(), CheckoutError> {
        let _gate = self.write_gate.lock().await;
        let edits = std::mem::take(&mut *lock(&self.pending));
        if edits.is_empty() {
            return Ok(());
        }
        debug!(order_id = %self.order_id, edits = edits.len(), "Saving checkout edits");

        let mut first_error = None;
        let mut retry = Vec::new();
        for edit in edits {
            let field = edit.field();
            if let Err(e) = self
                .service
                .update_checkout_field(self.order_id, edit.clone())
                .await
            {
                warn!(order_id = %self.order_id, ?field, error = %e, "Checkout save failed");
                if e.is_retryable() {
                    retry.push(edit);
                }
                first_error.get_or_insert(e);
            }
        }

        if !retry.is_empty() {
            let mut pending = lock(&self.pending);
            // edits typed during the flush are newer than the ones being retried
            retry.retain(|old| pending.iter().all(|new| new.field() != old.field()));
            retry.append(&mut pending);
            *pending = retry;
        }

        *lock(&self.last_error) = first_error.clone();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
