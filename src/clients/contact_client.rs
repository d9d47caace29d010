use crate::contact_actor::{ContactAction, ContactError};
use crate::model::{
    contact_book_key, ContactBook, ContactBookCreate, ContactEdit, ContactEntry, ContactEntryId,
    ContactKind, CustomerId,
};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, Query, ResourceClient};
use tracing::{debug, instrument};

/// Client for the Contact actor: the contact registry.
///
/// Each customer has one contact book row; every write below is a single action on it.
#[derive(Clone)]
pub struct ContactClient {
    inner: ResourceClient<ContactBook>,
}

impl ContactClient {
    pub fn new(inner: ResourceClient<ContactBook>) -> Self {
        Self { inner }
    }

    /// The customer's book, created empty on first use.
    #[instrument(skip(self))]
    pub async fn book_for(&self, customer_id: CustomerId) -> Result<ContactBook, ContactError> {
        let upserted = self
            .inner
            .upsert(contact_book_key(customer_id), ContactBookCreate { customer_id })
            .await
            .map_err(Self::map_error)?;
        Ok(upserted.item)
    }

    #[instrument(skip(self))]
    pub async fn book(&self, customer_id: CustomerId) -> Result<Option<ContactBook>, ContactError> {
        self.inner
            .lookup(contact_book_key(customer_id))
            .await
            .map_err(Self::map_error)
    }

    /// All entries of the customer, primary first, then oldest first.
    #[instrument(skip(self))]
    pub async fn contacts(&self, customer_id: CustomerId) -> Result<Vec<ContactEntry>, ContactError> {
        Ok(self
            .book(customer_id)
            .await?
            .map(|book| book.sorted_entries())
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn add_or_reuse(
        &self,
        customer_id: CustomerId,
        kind: ContactKind,
        value: &str,
        make_primary: bool,
    ) -> Result<ContactEntry, ContactError> {
        let book = self.book_for(customer_id).await?;
        debug!(book_id = %book.id, "Sending request");
        self.inner
            .perform_action(
                book.id,
                ContactAction::AddOrReuse {
                    kind,
                    value: value.to_string(),
                    make_primary,
                },
            )
            .await
            .map_err(Self::map_error)
    }

    /// Fails with `NotFound` when `entry_id` is not a `kind` entry of `customer_id`.
    #[instrument(skip(self))]
    pub async fn set_primary(
        &self,
        customer_id: CustomerId,
        kind: ContactKind,
        entry_id: ContactEntryId,
    ) -> Result<ContactEntry, ContactError> {
        let book = self.book(customer_id).await?.ok_or_else(|| {
            ContactError::NotFound(format!("{} for {}", entry_id, customer_id))
        })?;
        self.inner
            .perform_action(book.id, ContactAction::SetPrimary { kind, entry_id })
            .await
            .map_err(Self::map_error)
    }

    /// Removes an entry and returns it. Removing a primary leaves no primary of that kind.
    #[instrument(skip(self))]
    pub async fn remove(&self, entry_id: ContactEntryId) -> Result<ContactEntry, ContactError> {
        let book = self.holder_of(entry_id).await?;
        self.inner
            .perform_action(book.id, ContactAction::Remove { entry_id })
            .await
            .map_err(Self::map_error)
    }

    /// Changes an entry's value, refusing a value another entry of the same kind has.
    #[instrument(skip(self))]
    pub async fn edit_entry(
        &self,
        entry_id: ContactEntryId,
        value: &str,
    ) -> Result<ContactEntry, ContactError> {
        let book = self.holder_of(entry_id).await?;
        let book = self
            .inner
            .update(
                book.id,
                ContactEdit {
                    entry_id,
                    value: value.to_string(),
                },
            )
            .await
            .map_err(Self::map_error)?;
        book.entry(entry_id)
            .cloned()
            .ok_or_else(|| ContactError::NotFound(entry_id.to_string()))
    }

    /// Deletes the customer's book, if any. Returns whether one existed.
    #[instrument(skip(self))]
    pub async fn discard_book(&self, customer_id: CustomerId) -> Result<bool, ContactError> {
        let Some(book) = self.book(customer_id).await? else {
            return Ok(false);
        };
        self.delete(book.id).await?;
        debug!(book_id = %book.id, "Contact book deleted");
        Ok(true)
    }

    async fn holder_of(&self, entry_id: ContactEntryId) -> Result<ContactBook, ContactError> {
        self.find(
            Query::new()
                .filter(move |book: &ContactBook| book.contains(entry_id))
                .limit(1),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ContactError::NotFound(entry_id.to_string()))
    }
}

#[async_trait]
impl ActorClient<ContactBook> for ContactClient {
    type Error = ContactError;

    fn inner(&self) -> &ResourceClient<ContactBook> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => ContactError::NotFound(id),
            FrameworkError::UniqueViolation(key) => ContactError::AlreadyExists(key),
            other => other
                .downcast_entity::<ContactError>()
                .unwrap_or_else(|e| ContactError::ActorCommunicationError(e.to_string())),
        }
    }
}
