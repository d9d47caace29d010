//! Plain data for the live-sale checkout: customers, their contacts, sale sessions and orders.
//!
//! Each row type implements [`ActorEntity`](resource_actor::ActorEntity) in its `*_actor`
//! module; this module only holds the data and the pure helpers around it.

pub mod checkout;
pub mod contact;
pub mod customer;
pub mod order;
pub mod session;

pub use checkout::*;
pub use contact::*;
pub use customer::*;
pub use order::*;
pub use session::*;
