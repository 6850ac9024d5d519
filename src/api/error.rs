//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::QueryError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Query validation or execution error
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Status, machine-readable code and caller-facing message.
    ///
    /// Server faults get a generic message; the detail only goes to the log.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Query(e) => match e {
                QueryError::MissingParameter(_) => {
                    (StatusCode::BAD_REQUEST, "MISSING_PARAMETER", e.to_string())
                }
                QueryError::InvalidField(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_FIELD", e.to_string())
                }
                QueryError::InvalidDate { .. } | QueryError::InvalidDateRange { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_DATE", e.to_string())
                }
                QueryError::NoDataFound => (StatusCode::NOT_FOUND, "NO_DATA_FOUND", e.to_string()),
                QueryError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_FAILURE",
                    "Failed to query the record store".to_string(),
                ),
            },
            ApiError::Internal(_) | ApiError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
