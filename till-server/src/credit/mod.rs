//! Client credit ledger collaborator.
//!
//! Deferred-debt payments hand the order-scoped allocation to an external
//! ledger that appends a debt entry and returns the client's new balance.
//! The call is made after the payment committed in memory and is never
//! awaited for correctness — a failure degrades the debt trail, not the
//! payment.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use shared::billing::PaymentItem;

/// Debt entry handed to the credit ledger for one order's share of an act
#[derive(Debug, Clone, Serialize)]
pub struct DebtEntry {
    pub client_id: String,
    /// Order-scoped allocated amount for the credit mode
    pub amount: f64,
    pub table_id: String,
    pub order_id: String,
    pub items: Vec<PaymentItem>,
    /// This order's share of the act discount
    pub discount_share: f64,
}

#[derive(Debug, Error)]
pub enum CreditError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Credit ledger unavailable: {0}")]
    Unavailable(String),
}

/// External credit ledger interface
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Append a debt entry and return the client's new balance
    async fn record_debt(&self, entry: &DebtEntry) -> Result<f64, CreditError>;
}

/// In-process ledger keeping balances in memory; the default collaborator
/// for a standalone till and for tests.
#[derive(Debug, Default)]
pub struct InMemoryCreditLedger {
    balances: DashMap<String, f64>,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, client_id: &str) -> f64 {
        self.balances.get(client_id).map(|b| *b).unwrap_or(0.0)
    }
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn record_debt(&self, entry: &DebtEntry) -> Result<f64, CreditError> {
        let mut balance = self.balances.entry(entry.client_id.clone()).or_insert(0.0);
        *balance += entry.amount;
        tracing::info!(
            client_id = %entry.client_id,
            order_id = %entry.order_id,
            amount = entry.amount,
            balance = *balance,
            "Recorded credit debt"
        );
        Ok(*balance)
    }
}
