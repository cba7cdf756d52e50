//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<T, AppError>`; the status comes from
//! [`vs_core::Error::http_status`]. Server errors are logged and rendered
//! with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: vs_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: vs_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn inner(&self) -> &vs_core::Error {
        &self.inner
    }
}

impl From<vs_core::Error> for AppError {
    fn from(e: vs_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = ?self.request_id,
                "Server error in API handler"
            );
        }

        let code = match &self.inner {
            vs_core::Error::NotFound { .. } => "not_found",
            vs_core::Error::Unauthorized(_) => "unauthorized",
            vs_core::Error::Validation(_) => "validation_error",
            vs_core::Error::Conflict { .. } => "conflict",
            vs_core::Error::ForeignKey(_) => "foreign_key_violation",
            vs_core::Error::Database { .. } => "database_error",
            vs_core::Error::Io { .. } => "io_error",
            vs_core::Error::Internal(_) => "internal_error",
        };

        let message = match &self.inner {
            vs_core::Error::Conflict { .. } => "Unique constraint conflict".to_string(),
            _ if status.is_server_error() => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "error": message,
            "code": code,
            "request_id": self.request_id,
        });
        if let vs_core::Error::Conflict { field } = &self.inner {
            body["field"] = json!(field);
        }

        (status, axum::Json(body)).into_response()
    }
}
