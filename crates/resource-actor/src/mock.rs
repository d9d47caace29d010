//! # Mock Tables
//!
//! [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are answered from a
//! queue of expectations instead of a table actor. Use it to test code that sits *around* a
//! table (a domain client, an entity hook that consults another table) without spawning the
//! actor it talks to.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **State** | none, answers are scripted | real rows and unique keys |
//! | **Error injection** | `return_err` | requires building the failing state |
//! | **Use case** | logic around a client | the table itself or the full system |
//!
//! Expectations are consumed in order. A request that does not match the next expectation
//! panics the mock task, which the caller observes as
//! [`FrameworkError::ActorDropped`](crate::FrameworkError::ActorDropped); [`MockClient::verify`]
//! then reports the leftover expectations.
//!
//! ```rust
//! use resource_actor::mock::MockClient;
//! use resource_actor::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Seat { id: u32 }
//! #[derive(Debug)] struct SeatCreate;
//! #[derive(Debug)] enum SeatAction {}
//! #[derive(Debug, thiserror::Error)] #[error("seat error")] struct SeatError;
//!
//! #[async_trait]
//! impl ActorEntity for Seat {
//!     type Id = u32; type Create = SeatCreate; type Update = ();
//!     type Action = SeatAction; type ActionResult = (); type Context = (); type Error = SeatError;
//!     fn from_create_params(id: u32, _: SeatCreate) -> Result<Self, SeatError> { Ok(Self { id }) }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), SeatError> { Ok(()) }
//!     async fn handle_action(&mut self, a: SeatAction, _: &()) -> Result<(), SeatError> { match a {} }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Seat>::new();
//!     mock.expect_get(1).return_ok(Some(Seat { id: 1 }));
//!     mock.expect_get(2).return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert!(client.get(1).await.unwrap().is_some());
//!     assert!(matches!(client.get(2).await, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! The lower-level [`create_mock_client`] returns the raw request receiver instead, for tests
//! that want to inspect payloads and answer by hand.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Upserted};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::error;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted answer for the next request.
enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Lookup {
        key: String,
        response: Result<Option<T>, FrameworkError>,
    },
    Find {
        response: Result<Vec<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Upsert {
        key: String,
        response: Result<Upserted<T>, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn kind(&self) -> &'static str {
        match self {
            Expectation::Get { .. } => "Get",
            Expectation::Lookup { .. } => "Lookup",
            Expectation::Find { .. } => "Find",
            Expectation::Create { .. } => "Create",
            Expectation::Upsert { .. } => "Upsert",
            Expectation::Update { .. } => "Update",
            Expectation::Delete { .. } => "Delete",
            Expectation::Action { .. } => "Action",
        }
    }
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Answers `respond_to` when the request targets the expected id or key.
fn answer<K, R>(
    kind: &str,
    expected: &K,
    actual: &K,
    respond_to: oneshot::Sender<Result<R, FrameworkError>>,
    response: Result<R, FrameworkError>,
) where
    K: PartialEq + std::fmt::Debug,
{
    if expected != actual {
        error!(kind, ?expected, ?actual, "Mock target mismatch");
        panic!("{kind}: expected target {expected:?}, got {actual:?}");
    }
    let _ = respond_to.send(response);
}

/// A mock table driven by queued expectations.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();
                match (request, expectation) {
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response })) => {
                        answer("Get", &want, &id, respond_to, response)
                    }
                    (ResourceRequest::Lookup { key, respond_to }, Some(Expectation::Lookup { key: want, response })) => {
                        answer("Lookup", &want, &key, respond_to, response)
                    }
                    (ResourceRequest::Find { respond_to, .. }, Some(Expectation::Find { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Upsert { key, respond_to, .. }, Some(Expectation::Upsert { key: want, response })) => {
                        answer("Upsert", &want, &key, respond_to, response)
                    }
                    (ResourceRequest::Update { id, respond_to, .. }, Some(Expectation::Update { id: want, response })) => {
                        answer("Update", &want, &id, respond_to, response)
                    }
                    (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: want, response })) => {
                        answer("Delete", &want, &id, respond_to, response)
                    }
                    (ResourceRequest::Action { id, respond_to, .. }, Some(Expectation::Action { id: want, response })) => {
                        answer("Action", &want, &id, respond_to, response)
                    }
                    (request, expectation) => {
                        let expected = expectation.as_ref().map_or("nothing", Expectation::kind);
                        error!(got = request.kind(), expected, "Unexpected mock request");
                        panic!("Unexpected {} request, expected {}", request.kind(), expected);
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn push(&self, expectation: Expectation<T>) {
        lock(&self.expectations).push_back(expectation);
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_lookup(&mut self, key: impl Into<String>) -> ExpectationBuilder<'_, T, Option<T>> {
        let key = key.into();
        self.builder(move |response| Expectation::Lookup { key, response })
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<'_, T, Vec<T>> {
        self.builder(|response| Expectation::Find { response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<'_, T, T::Id> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_upsert(&mut self, key: impl Into<String>) -> ExpectationBuilder<'_, T, Upserted<T>> {
        let key = key.into();
        self.builder(move |response| Expectation::Upsert { key, response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<'_, T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    fn builder<R>(
        &mut self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + 'static,
    ) -> ExpectationBuilder<'_, T, R> {
        ExpectationBuilder {
            mock: self,
            make: Box::new(make),
        }
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.expectations).len()
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = self.remaining();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Completes an `expect_*` call with the scripted answer.
pub struct ExpectationBuilder<'a, T: ActorEntity, R> {
    mock: &'a MockClient<T>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T>>,
}

impl<T: ActorEntity, R> ExpectationBuilder<'_, T, R> {
    pub fn return_ok(self, value: R) {
        self.mock.push((self.make)(Ok(value)));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.mock.push((self.make)(Err(error)));
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on, for tests that answer by hand.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request, if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Upsert.
pub async fn expect_upsert<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    String,
    T::Create,
    oneshot::Sender<Result<Upserted<T>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Upsert {
            key,
            params,
            respond_to,
        }) => Some((key, params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
