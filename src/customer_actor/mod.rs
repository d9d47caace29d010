//! # Customer Table
//!
//! Customers keyed by a case-insensitive unique alias.
//!
//! - [`entity`]: [`ActorEntity`](resource_actor::ActorEntity) implementation for
//!   [`Customer`](crate::model::Customer)
//! - [`error`]: [`CustomerError`]
//!
//! The actor's context is the pair ([`OrderClient`](crate::clients::OrderClient),
//! [`ContactClient`](crate::clients::ContactClient)): deleting a customer asks the order table
//! whether any order still references it, then removes the customer's contact book.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::CustomerClient;
use crate::model::Customer;
use resource_actor::ResourceActor;

/// Creates a new Customer actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Customer>, CustomerClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CustomerClient::new(generic_client))
}
