//! # Session Table
//!
//! Live and regular sale sessions. While a session is open it holds the
//! [`OPEN_SESSION_KEY`](crate::model::OPEN_SESSION_KEY) unique key, so a second open session
//! is refused by the store.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::SessionClient;
use crate::model::Session;
use resource_actor::ResourceActor;

/// Actions on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Closes the session and records `closed_at`.
    Close,
}

/// Creates a new Session actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Session>, SessionClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, SessionClient::new(generic_client))
}
