//! Till server: payment allocation and reconciliation engine for a
//! restaurant point of sale.
//!
//! A payment act selects unpaid items across a table's open orders (oldest
//! first), allocates the discount and the tendered amounts proportionally to
//! each touched order, and writes one record per order and tender mode.
//! Reporting reconstructs the real transactions from those per-order
//! duplicates and builds the period totals.

pub mod api;
pub mod core;
pub mod credit;
pub mod notify;
pub mod payments;
pub mod persistence;
pub mod tables;
pub mod utils;
