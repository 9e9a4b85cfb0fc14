//! API error handling
//!
//! Maps application failures onto HTTP statuses with a small JSON body.
//! Internal errors are logged and returned without their details.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Batch item input rejected before any vendor call
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        item: Option<usize>,
        field: Option<String>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The Cloud API failed in a way the caller cannot fix
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Index of the failing batch item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<usize>,
    /// Offending input field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Validation { .. } => "validation_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::BadGateway(_) => "bad_gateway",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let body = match self {
            Self::Validation {
                message,
                item,
                field,
            } => ErrorResponse {
                error: message,
                code,
                item,
                field,
            },
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorResponse {
                    error: "An internal error occurred".to_string(),
                    code,
                    item: None,
                    field: None,
                }
            },
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::BadGateway(msg)
            | Self::ServiceUnavailable(msg) => ErrorResponse {
                error: msg,
                code,
                item: None,
                field: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation {
                item,
                field,
                message,
            } => Self::Validation {
                message,
                item: Some(item),
                field: Some(field),
            },
            ApplicationError::Domain(e) => Self::Validation {
                field: e.field().map(str::to_string),
                message: e.to_string(),
                item: None,
            },
            ApplicationError::Authentication(msg) => Self::Unauthorized(msg),
            ApplicationError::NotFound(msg) => Self::NotFound(msg),
            ApplicationError::BadRequest(msg) => Self::BadRequest(msg),
            ApplicationError::ExternalService(msg) => Self::BadGateway(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}
