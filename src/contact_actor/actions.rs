//! Custom actions for the Contact actor.

use crate::model::{ContactEntryId, ContactKind};

/// Primary-flag aware writes on a customer's contact book.
///
/// Every action returns the [`ContactEntry`](crate::model::ContactEntry) it touched.
#[derive(Debug, Clone)]
pub enum ContactAction {
    /// Adds `value` (trimmed) or reuses the existing entry with that value.
    ///
    /// A new entry is primary when the customer has no primary of that kind yet or when
    /// `make_primary` is set; a reused entry is promoted only when `make_primary` is set.
    AddOrReuse {
        kind: ContactKind,
        value: String,
        make_primary: bool,
    },
    /// Makes `entry_id` the only primary of `kind`.
    SetPrimary {
        kind: ContactKind,
        entry_id: ContactEntryId,
    },
    /// Removes an entry. Removing the primary leaves the customer without one of that kind.
    Remove { entry_id: ContactEntryId },
}
