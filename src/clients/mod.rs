//! Typed wrappers around [`ResourceClient`](resource_actor::ResourceClient), one per table.
//!
//! Each client maps store failures back into its table's error type, downcasting the entity
//! error carried through the channel so its [`ErrorKind`](crate::error::ErrorKind) survives.

pub mod contact_client;
pub mod customer_client;
pub mod order_client;
pub mod session_client;

pub use contact_client::*;
pub use customer_client::*;
pub use order_client::*;
pub use session_client::*;
