//! # Checkout
//!
//! - [`readiness`]: pure predicates deciding whether an order may be confirmed
//! - [`service`]: [`CheckoutService`], loading the checkout, saving edits, confirming
//! - [`form`]: [`CheckoutForm`], debounced saving of the form's edits

pub mod form;
pub mod readiness;
pub mod service;

pub use form::*;
pub use readiness::*;
pub use service::*;
