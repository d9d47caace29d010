//! # Line Capture
//!
//! - [`capture`]: [`OrderLineReconciler`], from a typed line to an order line
//! - [`draft`]: [`LineDraft`], parsing and normalizing form input
//! - [`prompt`]: the merge-or-duplicate question and its [`MergePrompt`] implementations
//! - [`error`]: [`CaptureError`]

pub mod capture;
pub mod draft;
pub mod error;
pub mod prompt;

pub use capture::*;
pub use draft::*;
pub use error::*;
pub use prompt::*;
