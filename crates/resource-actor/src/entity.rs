//! # ActorEntity Trait
//!
//! The contract every stored row type (Customer, ContactBook, Session, Order) implements so a
//! generic [`ResourceActor`](crate::ResourceActor) can own a table of them.
//!
//! Associated types pin down which payload goes with which table: an `Order` table only
//! accepts `OrderCreate`, never a `CustomerCreate`. Hooks run inside the owning actor task,
//! so they observe and mutate rows without any locking.
//!
//! # Unique keys
//! [`ActorEntity::unique_keys`] is the table's uniqueness constraint. The actor keeps an index
//! from key to row id and rejects any write that would make two rows share a key. This is what
//! makes insert-or-return ([`ResourceClient::upsert`](crate::ResourceClient::upsert)) and
//! "at most one X per Y" rules race-free across callers.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any row type must implement to be managed by a `ResourceActor`.
///
/// Hooks are `async` so an entity may consult other actors through its `Context`
/// (late-bound dependencies passed to `run()` rather than `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Row identifier. Generated by the actor from a `u32` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload used to insert a new row.
    type Create: Send + Sync + Debug;

    /// Payload used to patch an existing row.
    type Update: Send + Sync + Debug;

    /// Row-specific conditional writes (e.g. `AppendLine`, `SetPrimary`).
    type Action: Send + Sync + Debug;

    /// Result returned by an action.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected into every hook. Use `()` when none are needed.
    type Context: Send + Sync;

    /// One error enum per table, boxed through
    /// [`FrameworkError::EntityError`](crate::FrameworkError::EntityError) and recovered by the
    /// typed client with [`FrameworkError::downcast_entity`](crate::FrameworkError::downcast_entity).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the row from its generated id and the insert payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Keys that must be unique across the whole table. Recomputed after every write.
    fn unique_keys(&self) -> Vec<String> {
        Vec::new()
    }

    // --- Lifecycle Hooks (Async) ---

    /// Called after `from_create_params`, before the row becomes visible.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply a patch. Runs on a staged copy; an error discards the copy.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called before removal. Returning an error keeps the row.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Run a row-specific action. Runs on a staged copy; an error discards the copy.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
