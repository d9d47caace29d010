//! The operator's merge-or-duplicate decision.
//!
//! When a captured line matches an existing line of the order on (code, description), the
//! reconciler suspends on a [`MergePrompt`] until the operator answers.

use crate::model::{OrderId, OrderLine};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeDecision {
    /// Add the incoming quantity to the existing line.
    Merge,
    /// Append the incoming line next to the existing one.
    Duplicate,
    /// Drop the capture without writing anything.
    Abort,
}

/// What the operator is asked about.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    pub order_id: OrderId,
    pub order_number: String,
    pub existing: OrderLine,
    pub quantity: u32,
    pub unit_price: f64,
}

impl MergeRequest {
    /// Question shown to the operator.
    pub fn message(&self) -> String {
        format!(
            "Order {} already has {} x {} \"{}\". Merge and add {}?",
            self.order_number,
            self.existing.quantity,
            self.existing.code,
            self.existing.description,
            self.quantity
        )
    }
}

#[async_trait]
pub trait MergePrompt: Send + Sync {
    async fn decide(&self, request: &MergeRequest) -> MergeDecision;
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub MergeDecision);

#[async_trait]
impl MergePrompt for FixedDecision {
    async fn decide(&self, _request: &MergeRequest) -> MergeDecision {
        self.0
    }
}

/// Adapts a yes/no `confirm(message)` callback: yes merges, no duplicates.
pub struct ConfirmMerge<F>(pub F);

#[async_trait]
impl<F> MergePrompt for ConfirmMerge<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn decide(&self, request: &MergeRequest) -> MergeDecision {
        if (self.0)(&request.message()) {
            MergeDecision::Merge
        } else {
            MergeDecision::Duplicate
        }
    }
}

/// A question waiting for the UI to answer it.
#[derive(Debug)]
pub struct PendingDecision {
    pub request: MergeRequest,
    respond_to: oneshot::Sender<MergeDecision>,
}

impl PendingDecision {
    pub fn answer(self, decision: MergeDecision) {
        let _ = self.respond_to.send(decision);
    }
}

/// Forwards each question to a UI task over a channel and waits for the answer.
///
/// Dropping a [`PendingDecision`] unanswered, or the receiver, counts as `Abort`.
#[derive(Clone)]
pub struct ChannelPrompt {
    sender: mpsc::Sender<PendingDecision>,
}

impl ChannelPrompt {
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<PendingDecision>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MergePrompt for ChannelPrompt {
    async fn decide(&self, request: &MergeRequest) -> MergeDecision {
        let (respond_to, answer) = oneshot::channel();
        let pending = PendingDecision {
            request: request.clone(),
            respond_to,
        };
        if self.sender.send(pending).await.is_err() {
            warn!(order_id = %request.order_id, "Merge prompt closed");
            return MergeDecision::Abort;
        }
        answer.await.unwrap_or(MergeDecision::Abort)
    }
}
