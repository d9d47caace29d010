//! # Order Table
//!
//! Orders with their lines, checkout fields and fulfillment status.
//!
//! - [`actions`]: line capture, checkout start, confirmation and stage transitions
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation for
//!   [`Order`](crate::model::Order)
//! - [`lifecycle`]: the status transition table
//! - [`error`]: [`OrderError`]
//!
//! ## Unique keys
//!
//! | Key | Held while |
//! |-----|-----------|
//! | `order-number:{number}` | always |
//! | `open-order:{session}:{customer}` | status is `CREATED` |
//! | `line-code:{session}:{code}` | a live-session line carries that code |
//!
//! The second key gives every (session, customer) pair at most one order collecting lines;
//! the third rejects a live-session code already used by any order of the session.

pub mod actions;
pub mod entity;
pub mod error;
pub mod lifecycle;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::Order;
use resource_actor::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
