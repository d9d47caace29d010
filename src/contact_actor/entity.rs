//! Entity trait implementation for the ContactBook domain type.
//!
//! All primary-flag changes happen on the staged copy of one book and are checked by
//! [`ContactBook::check_primaries`] before the store commits them.

use super::actions::ContactAction;
use super::{ContactError, ContactIdAllocator};
use crate::model::{
    contact_book_key, ContactBook, ContactBookCreate, ContactBookId, ContactEdit, ContactEntry,
    ContactEntryId, ContactKind,
};
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::ActorEntity;

#[async_trait]
impl ActorEntity for ContactBook {
    type Id = ContactBookId;
    type Create = ContactBookCreate;
    type Update = ContactEdit;
    type Action = ContactAction;
    type ActionResult = ContactEntry;
    type Context = ContactIdAllocator;
    type Error = ContactError;

    fn from_create_params(id: ContactBookId, params: ContactBookCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            customer_id: params.customer_id,
            entries: Vec::new(),
        })
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![contact_book_key(self.customer_id)]
    }

    /// Changes the value of an entry, keeping values unique per kind.
    async fn on_update(
        &mut self,
        edit: ContactEdit,
        _ctx: &ContactIdAllocator,
    ) -> Result<(), Self::Error> {
        let kind = self.owned(edit.entry_id)?.kind;
        let value = normalize(kind, &edit.value)?;
        if self
            .entries
            .iter()
            .any(|e| e.kind == kind && e.id != edit.entry_id && e.value == value)
        {
            return Err(ContactError::DuplicateValue { kind, value });
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == edit.entry_id) {
            entry.value = value;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ContactAction,
        ids: &ContactIdAllocator,
    ) -> Result<ContactEntry, Self::Error> {
        let touched = match action {
            ContactAction::AddOrReuse {
                kind,
                value,
                make_primary,
            } => {
                let value = normalize(kind, &value)?;
                let existing = self
                    .entries
                    .iter()
                    .find(|e| e.kind == kind && e.value == value)
                    .map(|e| e.id);
                match existing {
                    Some(entry_id) => {
                        if make_primary {
                            self.promote(kind, entry_id);
                        }
                        entry_id
                    }
                    None => {
                        let is_primary = make_primary || self.primary(kind).is_none();
                        if is_primary {
                            self.demote(kind);
                        }
                        let entry = ContactEntry {
                            id: ids.next_id(),
                            customer_id: self.customer_id,
                            kind,
                            value,
                            is_primary,
                            created_at: Utc::now(),
                        };
                        let entry_id = entry.id;
                        self.entries.push(entry);
                        entry_id
                    }
                }
            }
            ContactAction::SetPrimary { kind, entry_id } => {
                if self.owned(entry_id)?.kind != kind {
                    return Err(ContactError::NotFound(format!(
                        "{} is not a {} of {}",
                        entry_id, kind, self.customer_id
                    )));
                }
                self.promote(kind, entry_id);
                entry_id
            }
            ContactAction::Remove { entry_id } => {
                let removed = self.owned(entry_id)?.clone();
                self.entries.retain(|e| e.id != entry_id);
                self.check_primaries()?;
                return Ok(removed);
            }
        };

        self.check_primaries()?;
        self.owned(touched).cloned()
    }
}

impl ContactBook {
    fn owned(&self, entry_id: ContactEntryId) -> Result<&ContactEntry, ContactError> {
        self.entry(entry_id).ok_or_else(|| {
            ContactError::NotFound(format!("{} for {}", entry_id, self.customer_id))
        })
    }

    fn demote(&mut self, kind: ContactKind) {
        for entry in self.entries.iter_mut().filter(|e| e.kind == kind) {
            entry.is_primary = false;
        }
    }

    /// Clears every sibling of `kind`, then flags `entry_id`.
    fn promote(&mut self, kind: ContactKind, entry_id: ContactEntryId) {
        self.demote(kind);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == entry_id) {
            entry.is_primary = true;
        }
    }

    /// At most one primary per kind.
    pub fn check_primaries(&self) -> Result<(), ContactError> {
        for kind in [ContactKind::Phone, ContactKind::Address] {
            if self.primary_count(kind) > 1 {
                return Err(ContactError::PrimaryConflict {
                    customer_id: self.customer_id,
                    kind,
                });
            }
        }
        Ok(())
    }
}

fn normalize(kind: ContactKind, value: &str) -> Result<String, ContactError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ContactError::EmptyValue(kind));
    }
    Ok(value.to_string())
}
