//! # Logging
//!
//! Every table actor logs its requests with the entity type and row id (`Created`,
//! `Upsert hit`, `Action failed`, ...), and every client method opens a span named after
//! itself, so a captured line reads as one nested trace:
//!
//! ```text
//! INFO capture_line:open_order_for: Upsert created entity_type="Order" key=open-order:1:1 size=1
//! INFO capture_line:append_line: Action ok entity_type="Order" id=order_1
//! INFO capture_line: Line captured order_id=order_1 line_id=line_1 code=JP1
//! ```
//!
//! `RUST_LOG` selects what is shown; when it is unset the configured fallback filter
//! (`LIVE_CHECKOUT_LOG`, `info` by default) applies.
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! RUST_LOG=live_checkout::checkout=debug,info cargo run
//! ```

use tracing_subscriber::EnvFilter;

/// Installs a compact subscriber filtered by `RUST_LOG`, or by `default_filter` when unset.
///
/// Call once, at startup.
pub fn setup_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // entity_type is logged as a field instead
        .compact()
        .init();
}
