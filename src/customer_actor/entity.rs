//! Entity trait implementation for the Customer domain type.

use crate::clients::{ContactClient, OrderClient};
use crate::customer_actor::CustomerError;
use crate::error::Precondition;
use crate::model::{alias_key, clean_name, Customer, CustomerCreate, CustomerId, CustomerUpdate};
use async_trait::async_trait;
use chrono::Utc;
use resource_actor::ActorEntity;
use std::convert::Infallible;
use tracing::debug;

#[async_trait]
impl ActorEntity for Customer {
    type Id = CustomerId;
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
    type Action = Infallible;
    type ActionResult = ();
    type Context = (OrderClient, ContactClient);
    type Error = CustomerError;

    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, Self::Error> {
        let alias = clean_name(&params.alias).ok_or(CustomerError::EmptyAlias)?;
        let now = Utc::now();
        Ok(Self {
            id,
            alias,
            real_name: params.real_name.as_deref().and_then(clean_name),
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_keys(&self) -> Vec<String> {
        vec![alias_key(&self.alias)]
    }

    /// Applies a profile edit.
    ///
    /// A blank alias is rejected; a blank real name clears it. A new alias that collides
    /// with another customer's is rejected by the store's unique index.
    async fn on_update(
        &mut self,
        update: CustomerUpdate,
        _ctx: &(OrderClient, ContactClient),
    ) -> Result<(), Self::Error> {
        if let Some(alias) = update.alias {
            self.alias = clean_name(&alias).ok_or(CustomerError::EmptyAlias)?;
        }
        if let Some(real_name) = update.real_name {
            self.real_name = clean_name(&real_name);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Refuses to delete a customer that any order still references, then drops their
    /// contact book.
    async fn on_delete(
        &self,
        ctx: &(OrderClient, ContactClient),
    ) -> Result<(), Self::Error> {
        let (orders, contacts) = ctx;
        let count = orders
            .customer_orders(self.id)
            .await
            .map_err(|e| CustomerError::ActorCommunicationError(e.to_string()))?
            .len();
        debug!(customer_id = %self.id, count, "Orders referencing customer");
        if count > 0 {
            return Err(Precondition::CustomerHasOrders(count).into());
        }
        contacts
            .discard_book(self.id)
            .await
            .map_err(|e| CustomerError::ActorCommunicationError(e.to_string()))?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: Infallible,
        _ctx: &(OrderClient, ContactClient),
    ) -> Result<(), Self::Error> {
        match action {}
    }
}
