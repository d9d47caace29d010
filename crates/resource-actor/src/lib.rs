//! # Resource Actor
//!
//! An in-process data store built from actors: one [`ResourceActor`] task per table, each
//! owning its rows and serving requests strictly one at a time. Callers talk to a table
//! through a cloneable [`ResourceClient`].
//!
//! ## Layers
//!
//! 1. **Entity** ([`ActorEntity`]): the row type, its payloads, hooks and unique keys.
//! 2. **Runtime** ([`ResourceActor`]): the request loop, id generation, the unique-key index.
//! 3. **Interface** ([`ResourceClient`], [`ActorClient`]): typed async calls.
//!
//! ## Store operations
//!
//! | Call | Meaning |
//! |------|---------|
//! | `create` | insert a row, returns its id |
//! | `upsert` | insert unless a row owns the key, returns the owner |
//! | `get` / `lookup` | fetch by id / by unique key |
//! | `find` | filter, order, limit ([`Query`]) |
//! | `update` | patch through `on_update` |
//! | `perform_action` | conditional write through `handle_action` |
//! | `delete` | remove, subject to `on_delete` |
//!
//! Writes are staged on a copy of the row; a hook error or a unique-key collision
//! ([`FrameworkError::UniqueViolation`]) discards the copy. Since one table processes one
//! request at a time, "check then write" inside a hook cannot interleave with another
//! caller's write to the same table.
//!
//! ## Context injection
//!
//! Dependencies are passed to `run(context)` rather than `new()`, so two actors can be created
//! first and wired afterwards. Keep the dependency graph acyclic: an actor that calls another
//! actor from a hook waits for that actor's answer.
//!
//! ```rust
//! use resource_actor::{ActorEntity, ResourceActor, ResourceClient};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Shelf { id: u32 }
//! #[derive(Clone, Debug)] struct Book { id: u32, shelf: u32 }
//! #[derive(Debug)] enum NoAction {}
//! #[derive(Debug, thiserror::Error)]
//! enum LibraryError {
//!     #[error("unknown shelf {0}")]
//!     UnknownShelf(u32),
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Shelf {
//!     type Id = u32; type Create = (); type Update = (); type Action = NoAction;
//!     type ActionResult = (); type Context = (); type Error = LibraryError;
//!     fn from_create_params(id: u32, _: ()) -> Result<Self, LibraryError> { Ok(Self { id }) }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), LibraryError> { Ok(()) }
//!     async fn handle_action(&mut self, a: NoAction, _: &()) -> Result<(), LibraryError> { match a {} }
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Book {
//!     type Id = u32; type Create = u32; type Update = (); type Action = NoAction;
//!     type ActionResult = (); type Context = ResourceClient<Shelf>; type Error = LibraryError;
//!     fn from_create_params(id: u32, shelf: u32) -> Result<Self, LibraryError> { Ok(Self { id, shelf }) }
//!     async fn on_create(&mut self, shelves: &ResourceClient<Shelf>) -> Result<(), LibraryError> {
//!         match shelves.get(self.shelf).await {
//!             Ok(Some(_)) => Ok(()),
//!             _ => Err(LibraryError::UnknownShelf(self.shelf)),
//!         }
//!     }
//!     async fn on_update(&mut self, _: (), _: &ResourceClient<Shelf>) -> Result<(), LibraryError> { Ok(()) }
//!     async fn handle_action(&mut self, a: NoAction, _: &ResourceClient<Shelf>) -> Result<(), LibraryError> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (shelf_actor, shelves) = ResourceActor::<Shelf>::new(8);
//!     let (book_actor, books) = ResourceActor::<Book>::new(8);
//!     tokio::spawn(shelf_actor.run(()));
//!     tokio::spawn(book_actor.run(shelves.clone()));
//!
//!     let shelf = shelves.create(()).await.unwrap();
//!     assert!(books.create(shelf).await.is_ok());
//!     assert!(books.create(99).await.is_err());
//! }
//! ```
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a client's requests from scripted expectations, so code around
//! a table can be tested without the table.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod query;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response, Upserted};
pub use query::Query;
