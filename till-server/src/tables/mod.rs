//! Table state: the registry owning all live orders.

pub mod registry;

pub use registry::TableRegistry;
