//! Durable storage: redb order store plus the fire-and-forget worker.

pub mod storage;
pub mod worker;

pub use storage::{BillingStore, StorageError, StorageResult};
pub use worker::{spawn, PersistHandle};
