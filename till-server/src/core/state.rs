use std::sync::Arc;

use crate::core::Config;
use crate::credit::CreditLedger;
use crate::notify::EventBus;
use crate::persistence::{self, BillingStore, PersistHandle};
use crate::tables::TableRegistry;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub registry: Arc<TableRegistry>,
    pub events: EventBus,
    pub persist: PersistHandle,
}

impl ServerState {
    /// Build the full state: open the store, spawn the persistence worker,
    /// restore live orders from disk
    pub fn new(
        config: Config,
        store: BillingStore,
        credit: Arc<dyn CreditLedger + Send + Sync>,
    ) -> anyhow::Result<Self> {
        let events = EventBus::new();
        let persist = persistence::spawn(store.clone());
        let registry = TableRegistry::new(events.clone(), persist.clone(), credit);

        let restored = store.load_orders()?;
        if !restored.is_empty() {
            tracing::info!(count = restored.len(), "Restoring orders from storage");
        }
        registry.restore(restored);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            events,
            persist,
        })
    }
}
