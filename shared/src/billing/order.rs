//! Order, note and item line types.
//!
//! An order belongs to a table and holds one main note plus any number of
//! sub-notes. Item lines track `quantity` and `paid_quantity` separately so
//! partial payments can settle a subset of a line. Totals are always derived
//! from the lines, never maintained incrementally.

use serde::{Deserialize, Serialize};

/// Note id reserved for the main note of every order.
pub const MAIN_NOTE_ID: &str = "main";

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Open and accruing partial payments
    #[default]
    Open,
    /// Client-submitted order awaiting staff confirmation
    PendingConfirmation,
    /// Declined by staff before accepting any payment (terminal)
    Declined,
    /// Fully paid and moved out of the active set (terminal)
    Archived,
}

/// One line of an order's note
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemLine {
    /// Item id (matching key for payments)
    pub item_id: String,
    /// Item display name
    pub name: String,
    /// Unit price
    pub unit_price: f64,
    /// Total quantity ordered
    pub quantity: i32,
    /// Quantity already settled by payments
    #[serde(default)]
    pub paid_quantity: i32,
}

impl ItemLine {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>, unit_price: f64, quantity: i32) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            paid_quantity: 0,
        }
    }

    /// Quantity not yet covered by any payment
    pub fn unpaid_quantity(&self) -> i32 {
        (self.quantity - self.paid_quantity).max(0)
    }
}

/// A sub-bill inside an order, grouping items for one payer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    /// `"main"` for the main note, generated otherwise
    pub id: String,
    /// Display name
    pub name: String,
    /// Ordered list of item lines
    pub lines: Vec<ItemLine>,
    /// Remaining unpaid value, derived by the ledger
    #[serde(default)]
    pub total: f64,
    /// True once every line is fully settled
    #[serde(default)]
    pub paid: bool,
}

impl Note {
    /// Create the main note of an order
    pub fn main(lines: Vec<ItemLine>) -> Self {
        Self {
            id: MAIN_NOTE_ID.to_string(),
            name: MAIN_NOTE_ID.to_string(),
            lines,
            total: 0.0,
            paid: false,
        }
    }

    /// Create a named sub-note with a generated id
    pub fn sub(name: impl Into<String>, lines: Vec<ItemLine>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            lines,
            total: 0.0,
            paid: false,
        }
    }

    pub fn is_main(&self) -> bool {
        self.id == MAIN_NOTE_ID
    }
}

/// An order attached to a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order id (assigned by server)
    pub id: String,
    /// Table the order belongs to
    pub table_id: String,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp (Unix millis) — FIFO matching visits oldest first
    pub created_at: i64,
    /// Notes; the main note is always first
    pub notes: Vec<Note>,
    /// Payment history (one record per order and tender mode per act)
    #[serde(default)]
    pub payments: Vec<super::payment::PaymentRecord>,
    /// Remaining unpaid total, derived by the ledger
    #[serde(default)]
    pub total: f64,
}

impl Order {
    /// Create a new open order with the given main-note lines
    pub fn new(table_id: impl Into<String>, lines: Vec<ItemLine>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            table_id: table_id.into(),
            status: OrderStatus::Open,
            created_at: chrono::Utc::now().timestamp_millis(),
            notes: vec![Note::main(lines)],
            payments: Vec::new(),
            total: 0.0,
        }
    }

    pub fn main_note(&self) -> &Note {
        &self.notes[0]
    }

    pub fn note(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }

    pub fn note_mut(&mut self, note_id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == note_id)
    }

    /// Whether the order can accept payments
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }
}
