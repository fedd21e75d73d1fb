//! Request and response shapes of the payment API.

use serde::{Deserialize, Serialize};

use super::payment::TenderMode;

/// One item selection of a payment request
///
/// When `order_id` and `note_id` are absent the selection matches across
/// the whole table, oldest order first. Main notes all share the id
/// `"main"`, so settling one specific order's main note requires the
/// `order_id` hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSelection {
    /// Restrict matching to this order id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Restrict matching to this note id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    /// Matching key
    pub item_id: String,
    /// Expected name; logged when it differs from the matched line, never a filter
    pub name: String,
    /// Quantity to settle
    pub quantity: i32,
}

/// One mode of a split payment act
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitTender {
    pub mode: TenderMode,
    pub entered_amount: f64,
    /// Required when `mode` is the deferred-debt mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_client_id: Option<String>,
}

/// Payment request for a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Items to settle
    pub items: Vec<ItemSelection>,
    /// Single-mode act: the mode and the amount tendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TenderMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entered_amount: Option<f64>,
    /// Required when `mode` is the deferred-debt mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_client_id: Option<String>,
    /// Multi-mode act; mutually exclusive with `mode`/`entered_amount`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_payments: Option<Vec<SplitTender>>,
    /// Discount for the whole act (rate when percent, fixed amount otherwise)
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub is_percent_discount: bool,
    /// Caller-declared ticket total after discount; wins over the computed
    /// ticket when the caller's own rounding differs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_amount: Option<f64>,
    /// Server (waiter) taking the payment
    pub server: String,
}

/// Payment response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Orders archived by this act
    pub archived_orders: Vec<String>,
    /// Total actually paid for the act
    pub total_paid: f64,
}

/// Item line of an order-opening request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

/// Open a new order on a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOrderRequest {
    pub items: Vec<NewItemLine>,
    /// Client-submitted orders start pending and must be confirmed
    #[serde(default)]
    pub pending_confirmation: bool,
}

/// Open a sub-note on an existing order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenNoteRequest {
    pub name: String,
    #[serde(default)]
    pub items: Vec<NewItemLine>,
}
