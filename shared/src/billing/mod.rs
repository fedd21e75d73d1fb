//! Billing domain model: orders, notes, item lines, payment records.

pub mod order;
pub mod payment;
pub mod request;

pub use order::{ItemLine, Note, Order, OrderStatus, MAIN_NOTE_ID};
pub use payment::{PaymentItem, PaymentRecord, TenderMode};
pub use request::{
    ItemSelection, NewItemLine, OpenNoteRequest, OpenOrderRequest, PaymentRequest,
    PaymentResponse, SplitTender,
};
