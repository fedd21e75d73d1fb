//! Fire-and-forget persistence worker.
//!
//! Payment handlers mutate in memory, enqueue the touched orders and respond
//! without waiting for disk. The worker applies idempotent upserts keyed by
//! order id; a failure is logged and dropped, never retried synchronously and
//! never rolled back into the in-memory state.

use shared::billing::Order;
use tokio::sync::mpsc;

use super::storage::BillingStore;

const QUEUE_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct PersistJob {
    pub order: Order,
}

/// Handle for enqueueing persistence jobs
#[derive(Debug, Clone)]
pub struct PersistHandle {
    tx: mpsc::Sender<PersistJob>,
}

impl PersistHandle {
    /// Enqueue an order snapshot for durable storage, without blocking
    pub fn enqueue(&self, order: Order) {
        let order_id = order.id.clone();
        if let Err(err) = self.tx.try_send(PersistJob { order }) {
            tracing::error!(order_id = %order_id, "Persistence queue rejected job: {}", err);
        }
    }
}

/// Spawn the persistence worker over the given store
pub fn spawn(store: BillingStore) -> PersistHandle {
    let (tx, mut rx) = mpsc::channel::<PersistJob>(QUEUE_CAPACITY);
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            let order_id = job.order.id.clone();
            let store = store.clone();
            // redb commits block; keep them off the async executor
            let result =
                tokio::task::spawn_blocking(move || store.upsert_order(&job.order)).await;
            match result {
                Ok(Ok(())) => {
                    tracing::debug!(order_id = %order_id, "Order persisted");
                }
                Ok(Err(err)) => {
                    tracing::error!(order_id = %order_id, "Failed to persist order: {}", err);
                }
                Err(err) => {
                    tracing::error!(order_id = %order_id, "Persistence task panicked: {}", err);
                }
            }
        }
        tracing::info!("Persistence worker stopped");
    });
    PersistHandle { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::billing::ItemLine;
    use std::time::Duration;

    #[tokio::test]
    async fn enqueued_order_reaches_the_store() {
        let store = BillingStore::open_in_memory().unwrap();
        let handle = spawn(store.clone());
        let order = Order::new("t1", vec![ItemLine::new("i1", "Espresso", 2.5, 1)]);
        handle.enqueue(order.clone());

        // Worker is asynchronous; poll briefly
        for _ in 0..50 {
            if store.load_order(&order.id).unwrap().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("order never persisted");
    }

    #[tokio::test]
    async fn later_upsert_wins() {
        let store = BillingStore::open_in_memory().unwrap();
        let handle = spawn(store.clone());
        let mut order = Order::new("t1", vec![]);
        handle.enqueue(order.clone());
        order.total = 9.0;
        handle.enqueue(order.clone());

        for _ in 0..50 {
            if let Some(stored) = store.load_order(&order.id).unwrap()
                && stored.total == 9.0
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("updated order never persisted");
    }
}
