//! Order API module

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/tables/{table_id}/orders",
            get(handler::list).post(handler::open),
        )
        .route(
            "/api/tables/{table_id}/orders/{order_id}/notes",
            post(handler::open_note),
        )
        .route(
            "/api/tables/{table_id}/orders/{order_id}/confirm",
            post(handler::confirm),
        )
        .route(
            "/api/tables/{table_id}/orders/{order_id}/decline",
            post(handler::decline),
        )
}
