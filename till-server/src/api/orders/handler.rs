//! Order handlers — opening, notes and the confirmation lifecycle.

use axum::Json;
use axum::extract::{Path, State};
use shared::billing::{OpenNoteRequest, OpenOrderRequest, Order};

use crate::core::{Result, ServerState};

/// GET /api/tables/{table_id}/orders
pub async fn list(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.registry.orders(&table_id)))
}

/// POST /api/tables/{table_id}/orders
pub async fn open(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
    Json(req): Json<OpenOrderRequest>,
) -> Result<Json<Order>> {
    let order = state.registry.open_order(&table_id, &req)?;
    Ok(Json(order))
}

/// POST /api/tables/{table_id}/orders/{order_id}/notes
pub async fn open_note(
    State(state): State<ServerState>,
    Path((table_id, order_id)): Path<(String, String)>,
    Json(req): Json<OpenNoteRequest>,
) -> Result<Json<Order>> {
    let order = state.registry.open_note(&table_id, &order_id, &req)?;
    Ok(Json(order))
}

/// POST /api/tables/{table_id}/orders/{order_id}/confirm
pub async fn confirm(
    State(state): State<ServerState>,
    Path((table_id, order_id)): Path<(String, String)>,
) -> Result<Json<Order>> {
    let order = state.registry.confirm_order(&table_id, &order_id)?;
    Ok(Json(order))
}

/// POST /api/tables/{table_id}/orders/{order_id}/decline
pub async fn decline(
    State(state): State<ServerState>,
    Path((table_id, order_id)): Path<(String, String)>,
) -> Result<Json<Order>> {
    let order = state.registry.decline_order(&table_id, &order_id)?;
    Ok(Json(order))
}
