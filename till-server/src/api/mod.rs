//! API routing
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`orders`] - order lifecycle (open, notes, confirm, decline)
//! - [`payments`] - payment acts
//! - [`reports`] - reconciled sales reports

pub mod health;
pub mod orders;
pub mod payments;
pub mod reports;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(reports::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
