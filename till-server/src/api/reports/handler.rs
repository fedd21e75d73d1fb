//! Reporting handler — reconciled sales totals for a period.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::core::{Result, ServerState};
use crate::payments::{self, SalesReport};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Period start (Unix millis, inclusive); defaults to the epoch
    #[serde(default)]
    pub from: i64,
    /// Period end (Unix millis, inclusive); defaults to now
    pub to: Option<i64>,
}

/// GET /api/reports?from=&to=
pub async fn report(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesReport>> {
    let to = query.to.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    if query.from > to {
        return Err(crate::core::ServerError::Validation(
            "period start is after period end".into(),
        ));
    }
    let records = state.registry.collect_records(query.from, to);
    Ok(Json(payments::aggregate(&records)))
}
