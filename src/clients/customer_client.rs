use crate::customer_actor::CustomerError;
use crate::model::{
    alias_key, clean_name, synthesize_alias, Customer, CustomerCreate, CustomerId,
    CustomerUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::{ActorClient, FrameworkError, Query, ResourceClient};
use tracing::{debug, info, instrument, warn};

/// Most rows [`CustomerClient::search`] returns.
pub const SEARCH_LIMIT: usize = 20;

/// Attempts at finding a free synthesized alias before giving up.
const ALIAS_ATTEMPTS: i64 = 5;

/// Client for the Customer actor: the customer directory.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl CustomerClient {
    pub fn new(inner: ResourceClient<Customer>) -> Self {
        Self { inner }
    }

    /// Returns the customer with this alias, creating it on first use.
    ///
    /// The alias is matched case-insensitively. Concurrent calls with the same alias all get
    /// the same customer: the insert is keyed on the alias in one store request.
    #[instrument(skip(self))]
    pub async fn resolve_or_create_by_alias(&self, alias: &str) -> Result<Customer, CustomerError> {
        let alias = clean_name(alias).ok_or(CustomerError::EmptyAlias)?;
        let key = alias_key(&alias);
        let upserted = self
            .inner
            .upsert(
                key,
                CustomerCreate {
                    alias,
                    real_name: None,
                },
            )
            .await
            .map_err(Self::map_error)?;
        if upserted.created {
            info!(customer_id = %upserted.item.id, "New customer from alias");
        }
        Ok(upserted.item)
    }

    /// Returns the oldest customer whose real name is exactly `real_name`, or creates one
    /// under a synthesized alias.
    ///
    /// Real names are not unique, so two concurrent calls for a new name can both create a
    /// customer.
    #[instrument(skip(self))]
    pub async fn resolve_or_create_by_real_name(
        &self,
        real_name: &str,
    ) -> Result<Customer, CustomerError> {
        let name = clean_name(real_name).ok_or(CustomerError::EmptyName)?;

        let wanted = name.clone();
        let existing = self
            .find(
                Query::new()
                    .filter(move |c: &Customer| c.real_name.as_deref() == Some(wanted.as_str()))
                    .limit(1),
            )
            .await?;
        if let Some(customer) = existing.into_iter().next() {
            debug!(customer_id = %customer.id, "Matched real name");
            return Ok(customer);
        }

        let stamp = Utc::now().timestamp_millis();
        for attempt in 0..ALIAS_ATTEMPTS {
            let alias = synthesize_alias(&name, stamp + attempt);
            let created = self
                .inner
                .create(CustomerCreate {
                    alias: alias.clone(),
                    real_name: Some(name.clone()),
                })
                .await
                .map_err(Self::map_error);
            match created {
                Ok(id) => {
                    info!(customer_id = %id, %alias, "New customer from real name");
                    return self.require(id).await;
                }
                Err(CustomerError::AliasTaken(_)) => {
                    warn!(%alias, "Synthesized alias taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(CustomerError::AliasTaken(synthesize_alias(&name, stamp)))
    }

    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Customers whose alias or real name contains `text` (case-insensitive), most recently
    /// updated first.
    #[instrument(skip(self))]
    pub async fn search(&self, text: &str) -> Result<Vec<Customer>, CustomerError> {
        let needle = text.trim().to_lowercase();
        let query = Query::new()
            .filter(move |c: &Customer| {
                c.alias.to_lowercase().contains(&needle)
                    || c
                        .real_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .order_by(|a, b| b.updated_at.cmp(&a.updated_at))
            .limit(SEARCH_LIMIT);
        self.find(query).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_alias(&self, alias: &str) -> Result<Option<Customer>, CustomerError> {
        self.inner
            .lookup(alias_key(alias))
            .await
            .map_err(Self::map_error)
    }

    /// Like `get`, but a missing row is an error.
    pub async fn require(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        self.get(id)
            .await?
            .ok_or_else(|| CustomerError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl ActorClient<Customer> for CustomerClient {
    type Error = CustomerError;

    fn inner(&self) -> &ResourceClient<Customer> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => CustomerError::NotFound(id),
            FrameworkError::UniqueViolation(key) => {
                CustomerError::AliasTaken(key.trim_start_matches("alias:").to_string())
            }
            other => other
                .downcast_entity::<CustomerError>()
                .unwrap_or_else(|e| CustomerError::ActorCommunicationError(e.to_string())),
        }
    }
}
