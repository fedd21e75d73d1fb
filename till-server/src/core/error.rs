use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::payments::PaymentError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid operation: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<PaymentError> for ServerError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(msg) => ServerError::Validation(msg),
            PaymentError::TableNotFound(id) => ServerError::NotFound(format!("table {}", id)),
            PaymentError::OrderNotFound(id) => ServerError::NotFound(format!("order {}", id)),
            PaymentError::NoteNotFound(id) => ServerError::NotFound(format!("note {}", id)),
            PaymentError::NoUnpaidItems => {
                ServerError::Validation("no unpaid items matched the selection".into())
            }
            PaymentError::InvalidOperation(msg) => ServerError::Conflict(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ServerError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ServerError::Internal(err) => {
                // Log internal errors without exposing details
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result alias for handlers
pub type Result<T> = std::result::Result<T, ServerError>;
