//! Payment API module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/tables/{table_id}/payments", post(handler::pay))
}
