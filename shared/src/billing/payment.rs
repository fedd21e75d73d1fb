//! Tender modes and payment records.
//!
//! A payment act that spans several orders is deliberately written once per
//! order it touched: `allocated_amount` is order-scoped, `entered_amount` is
//! the repeated per-mode constant of the act (for split acts) or the order's
//! proportional share (for single-mode acts). Reporting reconstructs the
//! real transactions from these duplicates.

use serde::{Deserialize, Serialize};

/// Closed set of tender modes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderMode {
    Cash,
    Card,
    /// Card terminal (TPE)
    Terminal,
    Cheque,
    /// Deferred debt, settled later through the client credit ledger
    Credit,
}

impl TenderMode {
    /// Card, terminal and cheque payments; the only modes that can carry a tip
    pub fn is_scriptural(&self) -> bool {
        matches!(self, TenderMode::Card | TenderMode::Terminal | TenderMode::Cheque)
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, TenderMode::Cash)
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, TenderMode::Credit)
    }
}

impl std::fmt::Display for TenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TenderMode::Cash => "CASH",
            TenderMode::Card => "CARD",
            TenderMode::Terminal => "TERMINAL",
            TenderMode::Cheque => "CHEQUE",
            TenderMode::Credit => "CREDIT",
        };
        f.write_str(s)
    }
}

/// Snapshot of an item quantity covered by one payment record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

/// One order-scoped payment record
///
/// A real transaction touching N orders produces N records sharing the same
/// `entered_amount` (and `split_payment_id` when the act used several modes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Record id, unique per record (not per transaction)
    pub payment_id: String,
    /// Act timestamp (Unix millis), identical across records of one act
    pub timestamp: i64,
    /// Table the act was taken on
    pub table_id: String,
    /// Order this record is scoped to; dedup counts distinct order ids
    pub order_id: String,
    /// Server (waiter) who took the payment; tip attribution key
    pub server: String,
    /// Note covered by this order's share of the act
    pub note_id: String,
    pub note_name: String,
    /// Tender mode of this record
    pub mode: TenderMode,
    /// Pre-discount value of the items this record covers
    pub subtotal: f64,
    /// Act-level discount as entered (rate when percent, amount otherwise)
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub is_percent_discount: bool,
    /// Computed total discount of the act, repeated on every record
    #[serde(default)]
    pub discount_amount: f64,
    /// Ticket share owed by this order for this mode, excluding tip
    pub allocated_amount: f64,
    /// Money actually tendered for this mode: the order's proportional share
    /// for single-mode acts, the repeated act constant for split acts
    pub entered_amount: f64,
    /// Tip (entered minus allocated), only on scriptural single-mode records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excess_amount: Option<f64>,
    /// True when any mode in the same act was cash
    #[serde(default)]
    pub has_cash_in_payment: bool,
    /// Set on every record of a multi-mode act
    #[serde(default)]
    pub is_split_payment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_payment_id: Option<String>,
    /// Item quantities covered within this order
    pub items: Vec<PaymentItem>,
    /// Flagged once the owning order archived as part of this act
    #[serde(default)]
    pub complete_payment: bool,
}
