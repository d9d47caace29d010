use crate::model::CustomerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which kind of contact an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Phone,
    Address,
}

impl Display for ContactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactKind::Phone => write!(f, "phone"),
            ContactKind::Address => write!(f, "address"),
        }
    }
}

/// Type-safe identifier for contact entries. Unique across all customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEntryId(pub u32);

impl Display for ContactEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contact_{}", self.0)
    }
}

/// One phone number or address of a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub id: ContactEntryId,
    pub customer_id: CustomerId,
    pub kind: ContactKind,
    pub value: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Type-safe identifier for contact books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactBookId(pub u32);

impl From<u32> for ContactBookId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ContactBookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contacts_{}", self.0)
    }
}

/// All contact entries of one customer, stored as a single row.
///
/// Keeping a customer's entries together makes every primary-flag change one atomic write:
/// the store never holds a state where two entries of a kind are primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactBook {
    pub id: ContactBookId,
    pub customer_id: CustomerId,
    pub entries: Vec<ContactEntry>,
}

/// Payload for opening a customer's contact book.
#[derive(Debug, Clone)]
pub struct ContactBookCreate {
    pub customer_id: CustomerId,
}

/// Edit of an entry's value.
#[derive(Debug, Clone)]
pub struct ContactEdit {
    pub entry_id: ContactEntryId,
    pub value: String,
}

impl ContactBook {
    pub fn primary(&self, kind: ContactKind) -> Option<&ContactEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == kind && entry.is_primary)
    }

    pub fn primary_count(&self, kind: ContactKind) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind && entry.is_primary)
            .count()
    }

    pub fn entry(&self, id: ContactEntryId) -> Option<&ContactEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: ContactEntryId) -> bool {
        self.entry(id).is_some()
    }

    /// Entries with primaries first, then oldest first.
    pub fn sorted_entries(&self) -> Vec<ContactEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.0.cmp(&b.id.0))
        });
        entries
    }
}

/// Unique-key form of a customer's book.
pub fn contact_book_key(customer_id: CustomerId) -> String {
    format!("contacts:{}", customer_id.0)
}

/// Primary entry of `kind` in a flat contact list.
pub fn primary_of(contacts: &[ContactEntry], kind: ContactKind) -> Option<&ContactEntry> {
    contacts
        .iter()
        .find(|entry| entry.kind == kind && entry.is_primary)
}
