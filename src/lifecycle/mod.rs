//! Runtime orchestration and lifecycle management.
//!
//! - [`CheckoutSystem`] - starts the four tables, wires their dependencies and shuts them down
//! - [`setup_tracing`] - installs the log subscriber

pub mod checkout_system;
pub mod tracing;

pub use self::checkout_system::*;
pub use self::tracing::*;
