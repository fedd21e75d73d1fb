//! Payment engine: item ledger, allocation, reconciliation and reporting.

pub mod aggregator;
pub mod allocator;
pub mod error;
pub mod ledger;
pub mod money;
pub mod reconciler;

pub use aggregator::{aggregate, SalesReport};
pub use allocator::{allocate, AllocationOutcome};
pub use error::{PaymentError, PaymentResult};
pub use reconciler::{reconcile, ReconciledAct, ReconciledTransaction};
