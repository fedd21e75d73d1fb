//! Shared domain types for the till server and its clients.
//!
//! Everything wire-visible lives here: orders, notes, item lines, payment
//! records and the request/response shapes of the payment API. The engine
//! crate (`till-server`) owns the behavior; this crate owns the data.

pub mod billing;

pub use billing::*;
