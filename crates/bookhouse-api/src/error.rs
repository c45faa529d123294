//! HTTP error mapping
//!
//! Handlers bubble domain errors up with `?`; this module decides which
//! status code and JSON body each one becomes. Internal details are logged
//! server-side and never leaked to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bookhouse_catalog::CatalogError;
use bookhouse_storage::Error as GatewayError;

use crate::models::ErrorResponse;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request input, reported back with the offending detail.
    BadRequest(String),
    /// Failure while assembling a response that is not the client's fault.
    Internal(String),
    /// Anything that went wrong past the HTTP boundary.
    Gateway(GatewayError),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Gateway(GatewayError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "response assembly failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error".to_string(),
                )
            }
            ApiError::Gateway(err) => {
                if matches!(err, GatewayError::UnsupportedFormat(_)) {
                    (StatusCode::BAD_REQUEST, "unsupported_format", err.to_string())
                } else if err.is_not_found() {
                    (StatusCode::NOT_FOUND, "not_found", err.to_string())
                } else {
                    tracing::error!(error = %err, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "internal server error".to_string(),
                    )
                }
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
