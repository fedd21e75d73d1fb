//! Payment error taxonomy
//!
//! Validation and no-match failures are reported before anything is
//! persisted; not-found failures leave every other entity in the batch
//! untouched. Downstream sync failures (credit ledger, persistence) are
//! never surfaced here — the payment already committed in memory.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid payment request: {0}")]
    Validation(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("No unpaid item found for any selection")]
    NoUnpaidItems,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;
