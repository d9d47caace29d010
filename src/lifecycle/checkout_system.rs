use crate::checkout::{CheckoutForm, CheckoutService};
use crate::clients::{ContactClient, CustomerClient, OrderClient, SessionClient};
use crate::config::CheckoutConfig;
use crate::contact_actor::ContactIdAllocator;
use crate::model::OrderId;
use crate::reconciler::{MergePrompt, OrderLineReconciler};
use tracing::{error, info};

/// Starts and owns the four tables.
///
/// The customer table is started with the order and contact clients as context, so deleting
/// a customer can check for orders and drop the contact book. No other table depends on
/// another.
///
/// ```ignore
/// let system = CheckoutSystem::new();
/// let session = system.sessions.open_session(SessionKind::Live, None).await?;
/// let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
/// reconciler.capture_line(&session.capture(), &identity, &draft).await?;
/// drop(reconciler);
/// system.shutdown().await?;
/// ```
pub struct CheckoutSystem {
    pub customers: CustomerClient,
    pub contacts: ContactClient,
    pub sessions: SessionClient,
    pub orders: OrderClient,
    config: CheckoutConfig,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for CheckoutSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutSystem {
    /// Starts the system with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CheckoutConfig::default())
    }

    pub fn with_config(config: CheckoutConfig) -> Self {
        let buffer = config.channel_buffer;

        let (customer_actor, customers) = crate::customer_actor::new(buffer);
        let (contact_actor, contacts) = crate::contact_actor::new(buffer);
        let (session_actor, sessions) = crate::session_actor::new(buffer);
        let (order_actor, orders) = crate::order_actor::new(buffer);

        let handles = vec![
            tokio::spawn(customer_actor.run((orders.clone(), contacts.clone()))),
            tokio::spawn(contact_actor.run(ContactIdAllocator::default())),
            tokio::spawn(session_actor.run(())),
            tokio::spawn(order_actor.run(())),
        ];
        info!(buffer, "Checkout system started");

        Self {
            customers,
            contacts,
            sessions,
            orders,
            config,
            handles,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(
            self.customers.clone(),
            self.contacts.clone(),
            self.orders.clone(),
        )
    }

    pub fn reconciler<P: MergePrompt>(&self, prompt: P) -> OrderLineReconciler<P> {
        OrderLineReconciler::new(
            self.customers.clone(),
            self.contacts.clone(),
            self.orders.clone(),
            prompt,
            &self.config,
        )
    }

    /// A debounced form for one order, saving after the configured idle delay.
    pub fn checkout_form(&self, order_id: OrderId) -> CheckoutForm {
        CheckoutForm::new(self.checkout(), order_id, self.config.save_debounce)
    }

    /// Drops the system's clients and waits for every table to stop.
    ///
    /// Tables stop once every client clone is gone, so services and forms handed out by
    /// this system must be dropped first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.customers);
        drop(self.sessions);
        // the customer table holds the last order and contact clients, released when it stops
        drop(self.contacts);
        drop(self.orders);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
