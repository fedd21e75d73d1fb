//! In-memory table registry, the single owner of live order state.
//!
//! Each table's orders live behind their own mutex; a payment holds that lock
//! for the whole consume, allocate and archive sequence so two concurrent
//! requests can never both settle the same unpaid units. Persistence and the
//! credit ledger run after the lock is released and are never awaited by the
//! caller.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::billing::{
    ItemLine, Note, OpenNoteRequest, OpenOrderRequest, Order, OrderStatus, PaymentRecord,
    PaymentRequest, PaymentResponse,
};

use crate::credit::CreditLedger;
use crate::notify::{EventBus, TableEvent};
use crate::payments::{self, ledger, PaymentError, PaymentResult};
use crate::persistence::PersistHandle;

/// Orders of one table
#[derive(Debug, Default)]
struct TableOrders {
    /// Open and pending orders, oldest first
    active: Vec<Order>,
    /// Archived and declined orders, kept for reporting
    settled: Vec<Order>,
}

/// Registry of all tables known to this till
pub struct TableRegistry {
    tables: DashMap<String, Arc<Mutex<TableOrders>>>,
    events: EventBus,
    persist: PersistHandle,
    credit: Arc<dyn CreditLedger + Send + Sync>,
}

impl TableRegistry {
    pub fn new(
        events: EventBus,
        persist: PersistHandle,
        credit: Arc<dyn CreditLedger + Send + Sync>,
    ) -> Self {
        Self {
            tables: DashMap::new(),
            events,
            persist,
            credit,
        }
    }

    /// Re-seed the registry from persisted orders at startup
    pub fn restore(&self, orders: Vec<Order>) {
        for order in orders {
            let table = self.table(&order.table_id);
            let mut guard = table.lock();
            match order.status {
                OrderStatus::Open | OrderStatus::PendingConfirmation => guard.active.push(order),
                OrderStatus::Archived | OrderStatus::Declined => guard.settled.push(order),
            }
        }
        for entry in self.tables.iter() {
            entry.value().lock().active.sort_by_key(|o| o.created_at);
        }
    }

    fn table(&self, table_id: &str) -> Arc<Mutex<TableOrders>> {
        self.tables
            .entry(table_id.to_string())
            .or_default()
            .clone()
    }

    fn existing_table(&self, table_id: &str) -> PaymentResult<Arc<Mutex<TableOrders>>> {
        self.tables
            .get(table_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PaymentError::TableNotFound(table_id.to_string()))
    }

    /// Open a new order on a table
    pub fn open_order(&self, table_id: &str, req: &OpenOrderRequest) -> PaymentResult<Order> {
        if req.items.is_empty() {
            return Err(PaymentError::Validation("order has no items".into()));
        }
        let lines: Vec<ItemLine> = req
            .items
            .iter()
            .map(|l| ItemLine::new(l.item_id.clone(), l.name.clone(), l.unit_price, l.quantity))
            .collect();
        let mut order = Order::new(table_id, lines);
        if req.pending_confirmation {
            order.status = OrderStatus::PendingConfirmation;
        }
        ledger::recompute_order_total(&mut order);

        let table = self.table(table_id);
        table.lock().active.push(order.clone());

        self.events.emit(TableEvent::OrderUpdated {
            table_id: table_id.to_string(),
            order: order.clone(),
        });
        self.persist.enqueue(order.clone());
        tracing::info!(table_id = %table_id, order_id = %order.id, "Order opened");
        Ok(order)
    }

    /// Open a named sub-note on an existing order
    pub fn open_note(
        &self,
        table_id: &str,
        order_id: &str,
        req: &OpenNoteRequest,
    ) -> PaymentResult<Order> {
        let table = self.existing_table(table_id)?;
        let mut guard = table.lock();
        let order = guard
            .active
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;
        if !order.is_open() {
            return Err(PaymentError::InvalidOperation(format!(
                "order {} cannot take a note in status {:?}",
                order_id, order.status
            )));
        }
        let lines: Vec<ItemLine> = req
            .items
            .iter()
            .map(|l| ItemLine::new(l.item_id.clone(), l.name.clone(), l.unit_price, l.quantity))
            .collect();
        order.notes.push(Note::sub(req.name.clone(), lines));
        ledger::recompute_order_total(order);
        let snapshot = order.clone();
        drop(guard);

        self.events.emit(TableEvent::OrderUpdated {
            table_id: table_id.to_string(),
            order: snapshot.clone(),
        });
        self.persist.enqueue(snapshot.clone());
        Ok(snapshot)
    }

    /// Staff confirmation of a client-submitted order
    pub fn confirm_order(&self, table_id: &str, order_id: &str) -> PaymentResult<Order> {
        self.transition(table_id, order_id, OrderStatus::Open, "confirm")
    }

    /// Staff decline of a client-submitted order (terminal)
    pub fn decline_order(&self, table_id: &str, order_id: &str) -> PaymentResult<Order> {
        self.transition(table_id, order_id, OrderStatus::Declined, "decline")
    }

    fn transition(
        &self,
        table_id: &str,
        order_id: &str,
        to: OrderStatus,
        verb: &str,
    ) -> PaymentResult<Order> {
        let table = self.existing_table(table_id)?;
        let mut guard = table.lock();
        let pos = guard
            .active
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;
        if guard.active[pos].status != OrderStatus::PendingConfirmation {
            return Err(PaymentError::InvalidOperation(format!(
                "cannot {} order {} in status {:?}",
                verb, order_id, guard.active[pos].status
            )));
        }
        guard.active[pos].status = to;
        let snapshot = if to == OrderStatus::Declined {
            let order = guard.active.remove(pos);
            guard.settled.push(order.clone());
            order
        } else {
            guard.active[pos].clone()
        };
        drop(guard);

        self.events.emit(TableEvent::OrderUpdated {
            table_id: table_id.to_string(),
            order: snapshot.clone(),
        });
        self.persist.enqueue(snapshot.clone());
        tracing::info!(table_id = %table_id, order_id = %order_id, status = ?to, "Order {}ed", verb);
        Ok(snapshot)
    }

    /// Take a payment on a table
    ///
    /// The whole consume, allocate and archive sequence runs under the
    /// table lock. Credit-ledger calls and persistence are spawned after
    /// the in-memory commit and never block the response.
    pub fn pay(&self, table_id: &str, req: &PaymentRequest) -> PaymentResult<PaymentResponse> {
        let table = self.existing_table(table_id)?;
        let mut guard = table.lock();

        let outcome = payments::allocate(&mut guard.active, table_id, req)?;

        // Move archived orders out of the active set
        let mut archived: Vec<Order> = Vec::new();
        guard.active.retain(|order| {
            if outcome.archived_orders.contains(&order.id) {
                archived.push(order.clone());
                false
            } else {
                true
            }
        });
        guard.settled.extend(archived.iter().cloned());

        let updated: Vec<Order> = guard
            .active
            .iter()
            .filter(|o| outcome.touched_orders.contains(&o.id))
            .cloned()
            .collect();
        drop(guard);

        for order in &updated {
            self.events.emit(TableEvent::OrderUpdated {
                table_id: table_id.to_string(),
                order: order.clone(),
            });
            self.persist.enqueue(order.clone());
        }
        for order in &archived {
            self.events.emit(TableEvent::OrderArchived {
                table_id: table_id.to_string(),
                order_id: order.id.clone(),
            });
            self.persist.enqueue(order.clone());
        }

        // Debt trail is best-effort; a ledger failure never fails the payment
        for debt in outcome.debts {
            let credit = self.credit.clone();
            tokio::spawn(async move {
                match credit.record_debt(&debt).await {
                    Ok(balance) => {
                        tracing::info!(
                            client_id = %debt.client_id,
                            amount = debt.amount,
                            balance,
                            "Debt recorded"
                        );
                    }
                    Err(err) => {
                        tracing::error!(
                            client_id = %debt.client_id,
                            amount = debt.amount,
                            "Failed to record debt: {}",
                            err
                        );
                    }
                }
            });
        }

        Ok(PaymentResponse {
            archived_orders: outcome.archived_orders,
            total_paid: outcome.total_paid,
        })
    }

    /// Active orders of one table
    pub fn orders(&self, table_id: &str) -> Vec<Order> {
        match self.tables.get(table_id) {
            Some(entry) => entry.value().lock().active.clone(),
            None => Vec::new(),
        }
    }

    /// Every payment record with an act timestamp inside `[from, to]`
    pub fn collect_records(&self, from: i64, to: i64) -> Vec<PaymentRecord> {
        let mut records = Vec::new();
        for entry in self.tables.iter() {
            let guard = entry.value().lock();
            for order in guard.active.iter().chain(guard.settled.iter()) {
                for record in &order.payments {
                    if record.timestamp >= from && record.timestamp <= to {
                        records.push(record.clone());
                    }
                }
            }
        }
        records.sort_by_key(|r| r.timestamp);
        records
    }
}
