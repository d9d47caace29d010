//! # Live Checkout
//!
//! Order capture and checkout for live-stream and in-store sales.
//!
//! Operators capture lines (`code`, description, price, quantity) against a customer during a
//! sale session. Lines are grouped into one order per (session, customer) while the order is
//! still collecting; a checkout form then gathers delivery and payment details and confirms the
//! order, which makes it read-only and hands it to preparation and delivery.
//!
//! ## Architecture Notes
//!
//! ### Tables as actors
//! Every table is a [`ResourceActor`](resource_actor::ResourceActor) running in its own task and
//! processing requests one at a time, so each request is atomic. Uniqueness rules (aliases,
//! order numbers, one open session, one collecting order per customer and session, live line
//! codes per session) are unique keys checked by the store, never read-then-write in a client.
//!
//! ### Errors
//! Each table has its own error enum and each service its own; all report an
//! [`ErrorKind`](error::ErrorKind).
//!
//! ### Observability
//! `tracing` everywhere; see [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`model`]: plain data (customers, contacts, sessions, orders, checkout fields)
//! - [`customer_actor`], [`contact_actor`], [`session_actor`], [`order_actor`]: the tables
//! - [`clients`]: typed clients, one per table
//! - [`reconciler`]: [`OrderLineReconciler`](reconciler::OrderLineReconciler), from a typed line
//!   to an order line
//! - [`checkout`]: readiness rules, the checkout service and the debounced form
//! - [`lifecycle`]: [`CheckoutSystem`](lifecycle::CheckoutSystem) wiring and shutdown, tracing
//! - [`config`]: environment configuration
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod checkout;
pub mod clients;
pub mod config;
pub mod contact_actor;
pub mod customer_actor;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod reconciler;
pub mod session_actor;
