//! Real-time table event fan-out.
//!
//! Events are emitted right after the in-memory mutation commits and are
//! independent of persistence. A lagging subscriber drops old events; the
//! bus never blocks the payment path.

use serde::{Deserialize, Serialize};
use shared::billing::Order;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Table-scoped change notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEvent {
    /// An order changed (items, payments, totals or status)
    OrderUpdated { table_id: String, order: Order },
    /// An order settled and left the active set
    OrderArchived { table_id: String, order_id: String },
}

/// Broadcast bus for table events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TableEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; silently dropped when nobody listens
    pub fn emit(&self, event: TableEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::trace!("No active event subscribers: {}", err);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
