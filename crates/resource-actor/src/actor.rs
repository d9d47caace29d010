//! # Table Actor
//!
//! [`ResourceActor`] is the server half of a table. It owns the rows of one entity type and
//! processes every request sequentially, so each request is atomic with respect to every
//! other request on the same table.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Upserted};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns one table.
///
/// State lives in the task; no `Mutex` guards the rows. Besides the rows the actor keeps
/// insertion order (so `find` without an explicit order is deterministic) and an index from
/// unique key to row id.
///
/// # Write protocol
///
/// `Update` and `Action` run their hook on a clone of the row. The clone replaces the stored
/// row only when the hook returned `Ok` and none of the clone's unique keys belong to another
/// row. A failed request therefore leaves the table exactly as it was.
///
/// ```rust
/// use resource_actor::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Tag { id: u32, label: String }
/// #[derive(Debug)] struct TagCreate(String);
/// #[derive(Debug)] enum TagAction {}
/// #[derive(Debug, thiserror::Error)] #[error("tag error")] struct TagError;
///
/// #[async_trait]
/// impl ActorEntity for Tag {
///     type Id = u32;
///     type Create = TagCreate;
///     type Update = String;
///     type Action = TagAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = TagError;
///
///     fn from_create_params(id: u32, p: TagCreate) -> Result<Self, TagError> {
///         Ok(Self { id, label: p.0 })
///     }
///     fn unique_keys(&self) -> Vec<String> { vec![format!("label:{}", self.label)] }
///     async fn on_update(&mut self, label: String, _: &()) -> Result<(), TagError> {
///         self.label = label;
///         Ok(())
///     }
///     async fn handle_action(&mut self, a: TagAction, _: &()) -> Result<(), TagError> { match a {} }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Tag>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let first = client.upsert("label:red".into(), TagCreate("red".into())).await.unwrap();
///     let again = client.upsert("label:red".into(), TagCreate("red".into())).await.unwrap();
///     assert!(first.created && !again.created);
///     assert_eq!(first.item.id, again.item.id);
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    order: Vec<T::Id>,
    index: HashMap<String, T::Id>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and its client. `buffer_size` bounds the request channel; callers
    /// wait for space when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the request loop until every client is dropped.
    ///
    /// `context` is handed to every hook, which lets an entity reach other actors created
    /// after this one.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let result = self.insert(params, &context).await.map(|(id, _)| id);
                    match &result {
                        Ok(id) => info!(entity_type, %id, size = self.store.len(), "Created"),
                        Err(e) => warn!(entity_type, error = %e, "Create failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Upsert {
                    key,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, %key, "Upsert");
                    if let Some(existing) = self.index.get(&key).and_then(|id| self.store.get(id))
                    {
                        debug!(entity_type, %key, "Upsert hit");
                        let _ = respond_to.send(Ok(Upserted {
                            item: existing.clone(),
                            created: false,
                        }));
                        continue;
                    }
                    let result = self.insert(params, &context).await.map(|(_, item)| Upserted {
                        item,
                        created: true,
                    });
                    match &result {
                        Ok(_) => info!(entity_type, %key, size = self.store.len(), "Upsert created"),
                        Err(e) => warn!(entity_type, %key, error = %e, "Upsert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Lookup { key, respond_to } => {
                    let item = self
                        .index
                        .get(&key)
                        .and_then(|id| self.store.get(id))
                        .cloned();
                    debug!(entity_type, %key, found = item.is_some(), "Lookup");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Find { query, respond_to } => {
                    let rows = query.apply(self.order.iter().filter_map(|id| self.store.get(id)));
                    debug!(entity_type, ?query, matched = rows.len(), "Find");
                    let _ = respond_to.send(Ok(rows));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut staged = current.clone();
                    let result = match staged.on_update(update, &context).await {
                        Ok(()) => self.commit(&id, staged.clone()).map(|()| staged),
                        Err(e) => Err(FrameworkError::EntityError(Box::new(e))),
                    };
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Updated"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Update failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(current) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut staged = current.clone();
                    let result = match staged.handle_action(action, &context).await {
                        Ok(outcome) => self.commit(&id, staged).map(|()| outcome),
                        Err(e) => Err(FrameworkError::EntityError(Box::new(e))),
                    };
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    async fn insert(
        &mut self,
        params: T::Create,
        context: &T::Context,
    ) -> Result<(T::Id, T), FrameworkError> {
        let id = T::Id::from(self.next_id);
        self.next_id += 1;

        let mut item = T::from_create_params(id.clone(), params)
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
        item.on_create(context)
            .await
            .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;

        let keys = item.unique_keys();
        if let Some(taken) = self.conflicting_key(None, &keys) {
            return Err(FrameworkError::UniqueViolation(taken));
        }
        for key in keys {
            self.index.insert(key, id.clone());
        }
        self.store.insert(id.clone(), item.clone());
        self.order.push(id.clone());
        Ok((id, item))
    }

    /// Replaces the stored row with `staged` if its keys are still free.
    fn commit(&mut self, id: &T::Id, staged: T) -> Result<(), FrameworkError> {
        let keys = staged.unique_keys();
        if let Some(taken) = self.conflicting_key(Some(id), &keys) {
            return Err(FrameworkError::UniqueViolation(taken));
        }
        self.index.retain(|_, owner| owner != id);
        for key in keys {
            self.index.insert(key, id.clone());
        }
        self.store.insert(id.clone(), staged);
        Ok(())
    }

    fn remove(&mut self, id: &T::Id) {
        self.store.remove(id);
        self.order.retain(|other| other != id);
        self.index.retain(|_, owner| owner != id);
    }

    /// First key that is repeated within `keys` or owned by a row other than `owner`.
    fn conflicting_key(&self, owner: Option<&T::Id>, keys: &[String]) -> Option<String> {
        let mut seen = HashSet::new();
        keys.iter()
            .find(|key| {
                !seen.insert(key.as_str())
                    || self
                        .index
                        .get(key.as_str())
                        .is_some_and(|holder| Some(holder) != owner)
            })
            .cloned()
    }
}
