//! API error types and JSON response formatting.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::form::ValidationError;
use crate::logging::error;
use crate::store::StoreError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error details in the response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn form_not_found(id: u64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "FORM_NOT_FOUND",
            format!("Form {} not found", id),
        )
        .with_details(serde_json::json!({ "id": id }))
    }

    /// Candidate rejected by the validator; every message goes in `details`.
    pub fn validation(err: &ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", err.to_string())
            .with_details(serde_json::json!({ "messages": err.messages() }))
    }

    pub fn invalid_form_data(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_FORM_DATA", message)
    }

    pub fn invalid_status(status: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_STATUS",
            format!("Status '{}' is not one of active, inactive, all", status),
        )
    }

    pub fn invalid_form_url() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_FORM_URL",
            "Invalid Formshive URL format. Expected https://api.formshive.com/v1/digest/{form-id}",
        )
    }

    pub fn remote_form_not_found(form_id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "REMOTE_FORM_NOT_FOUND",
            "Form not found or not accessible",
        )
        .with_details(serde_json::json!({ "form_id": form_id }))
    }

    pub fn remote_form_incomplete(form_id: &str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "REMOTE_FORM_INCOMPLETE",
            "Form exists but has no fields configured",
        )
        .with_details(serde_json::json!({ "form_id": form_id }))
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "A valid bearer token is required",
        )
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Validation(e) => Self::validation(e),
            StoreError::NotInitialized(path) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_NOT_INITIALIZED",
                format!("Store at '{}' is not initialized", path),
            ),
            _ => {
                error!(error = %err, "store operation failed");
                Self::internal(err.to_string())
            }
        }
    }
}
