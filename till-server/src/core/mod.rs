//! Server foundation: configuration, shared state and the error surface.

pub mod config;
pub mod error;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use state::ServerState;
