//! # ActorClient Trait
//!
//! Shared surface for table-specific clients: default `get`, `find` and `delete` built on the
//! generic [`ResourceClient`], with store errors mapped into the table's own error type.
use crate::{ActorEntity, FrameworkError, Query, ResourceClient};
use async_trait::async_trait;

/// Trait for table-specific clients to inherit the common read and delete operations.
///
/// ```rust
/// use resource_actor::{ActorClient, ActorEntity, FrameworkError, Query, ResourceActor, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: u32, body: String }
/// #[derive(Debug)] struct NoteCreate(String);
/// #[derive(Debug)] enum NoteAction {}
/// #[derive(Debug, thiserror::Error)]
/// enum NoteError {
///     #[error("note store unavailable: {0}")]
///     Unavailable(String),
/// }
///
/// #[async_trait]
/// impl ActorEntity for Note {
///     type Id = u32; type Create = NoteCreate; type Update = ();
///     type Action = NoteAction; type ActionResult = (); type Context = (); type Error = NoteError;
///     fn from_create_params(id: u32, p: NoteCreate) -> Result<Self, NoteError> {
///         Ok(Self { id, body: p.0 })
///     }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), NoteError> { Ok(()) }
///     async fn handle_action(&mut self, a: NoteAction, _: &()) -> Result<(), NoteError> { match a {} }
/// }
///
/// struct NoteClient { inner: ResourceClient<Note> }
///
/// #[async_trait]
/// impl ActorClient<Note> for NoteClient {
///     type Error = NoteError;
///     fn inner(&self) -> &ResourceClient<Note> { &self.inner }
///     fn map_error(e: FrameworkError) -> NoteError { NoteError::Unavailable(e.to_string()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, inner) = ResourceActor::<Note>::new(8);
///     tokio::spawn(actor.run(()));
///     let client = NoteClient { inner };
///
///     let id = client.inner().create(NoteCreate("hello".into())).await.unwrap();
///     let notes = client.find(Query::new().filter(|n: &Note| n.body.starts_with("he"))).await.unwrap();
///     assert_eq!(notes.len(), 1);
///     client.delete(id).await.unwrap();
///     assert!(client.get(id).await.unwrap().is_none());
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The table-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map store errors to the table error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a row by id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Rows matching `query`.
    #[tracing::instrument(skip(self))]
    async fn find(&self, query: Query<T>) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().find(query).await.map_err(Self::map_error)
    }

    /// Delete a row by id.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }
}
