//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Handler error that renders an [`AppError`] as a JSON response.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl HttpError {
    /// Message safe to show to clients.
    ///
    /// Storage and internal failures are reduced to a generic message.
    pub fn public_message(&self) -> String {
        match &self.0 {
            AppError::Validation(message) | AppError::NotFound(message) => message.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            _ => "Storage operation failed".to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), "Request failed: {}", self.0);
        }
        let body = json!({
            "success": false,
            "error": {
                "kind": self.0.kind(),
                "message": self.public_message(),
            }
        });
        (status, Json(body)).into_response()
    }
}
