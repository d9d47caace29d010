//! # Contact Table
//!
//! One [`ContactBook`](crate::model::ContactBook) row per customer holding all of their phone
//! numbers and addresses. Every primary-flag change is an action on that single row, so the
//! "at most one primary per kind" rule holds at every point the store can be observed.
//!
//! - [`actions`]: [`ContactAction`]
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation
//! - [`error`]: [`ContactError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::ContactClient;
use crate::model::{ContactBook, ContactEntryId};
use resource_actor::ResourceActor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Hands out contact entry ids, unique across every book of the table.
#[derive(Debug, Clone, Default)]
pub struct ContactIdAllocator(Arc<AtomicU32>);

impl ContactIdAllocator {
    pub fn next_id(&self) -> ContactEntryId {
        ContactEntryId(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Creates a new Contact actor and its client.
///
/// Run it with a [`ContactIdAllocator`] as context.
pub fn new(buffer_size: usize) -> (ResourceActor<ContactBook>, ContactClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, ContactClient::new(generic_client))
}
