//! Unified error handling for the reports service.
//!
//! Every failure surfaces to the client as the envelope
//! `{"success": false, "message": "..."}` with an appropriate status code.
//! Per-item resolution ambiguity never reaches this type: it is absorbed
//! inside the report pipeline, and only structural failures (bad input,
//! store unavailable, timeout) abort a request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the reports service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client (malformed dates, etc.).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The report computation exceeded the configured timeout.
    #[error("Report query timed out")]
    Timeout,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure envelope returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Timeout) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Report request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
