//! Payment handler — the single mutating entry point of the engine.

use axum::Json;
use axum::extract::{Path, State};
use shared::billing::{PaymentRequest, PaymentResponse};

use crate::core::{Result, ServerState};

/// POST /api/tables/{table_id}/payments
///
/// Runs synchronously under the table lock; persistence and the credit
/// ledger are fired after the response is decided.
pub async fn pay(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>> {
    let response = state.registry.pay(&table_id, &req)?;
    tracing::info!(
        table_id = %table_id,
        total_paid = response.total_paid,
        archived = response.archived_orders.len(),
        "Payment taken"
    );
    Ok(Json(response))
}
