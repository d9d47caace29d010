//! # Store Messages
//!
//! Requests sent from a [`ResourceClient`](crate::ResourceClient) to its
//! [`ResourceActor`](crate::ResourceActor), each carrying a oneshot channel for the reply.
//!
//! The set mirrors what callers need from a table:
//!
//! - **Create**: insert a new row.
//! - **Upsert**: insert unless a row already owns the given unique key, in which case that row
//!   is returned untouched.
//! - **Get** / **Lookup**: fetch by id or by unique key.
//! - **Find**: filter, order and limit.
//! - **Update** / **Action**: staged writes, committed only when the hook and the uniqueness
//!   check both succeed.
//! - **Delete**: remove a row, subject to its `on_delete` hook.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::query::Query;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Outcome of an upsert: the row owning the key and whether this call inserted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub item: T,
    pub created: bool,
}

/// Internal message type sent to the actor to request operations.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Upsert {
        key: String,
        params: T::Create,
        respond_to: Response<Upserted<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Lookup {
        key: String,
        respond_to: Response<Option<T>>,
    },
    Find {
        query: Query<T>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

impl<T: ActorEntity> ResourceRequest<T> {
    /// Short request name used in logs and mock diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceRequest::Create { .. } => "Create",
            ResourceRequest::Upsert { .. } => "Upsert",
            ResourceRequest::Get { .. } => "Get",
            ResourceRequest::Lookup { .. } => "Lookup",
            ResourceRequest::Find { .. } => "Find",
            ResourceRequest::Update { .. } => "Update",
            ResourceRequest::Delete { .. } => "Delete",
            ResourceRequest::Action { .. } => "Action",
        }
    }
}
