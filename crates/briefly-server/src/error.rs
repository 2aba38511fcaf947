//! Mapping from core errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use briefly_core::error::ValidationError;
use briefly_core::Error;
use serde_json::json;

const UNEXPECTED: &str = "Unexpected server error while summarizing text.";

/// Error returned by API handlers, rendered as `{"detail": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Unprocessable(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn too_large(limit: usize) -> Self {
        Self::PayloadTooLarge(format!(
            "Uploaded file is too large. Max {} bytes allowed.",
            limit
        ))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::BadRequest(d)
            | Self::PayloadTooLarge(d)
            | Self::Unprocessable(d)
            | Self::BadGateway(d)
            | Self::Internal(d) => d,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(ValidationError::InvalidMaxTokens(_)) => {
                Self::Unprocessable(err.to_string())
            }
            Error::Validation(e) => Self::BadRequest(e.to_string()),
            Error::Extraction(e) => {
                tracing::warn!("Extraction failed: {}", e);
                Self::BadRequest(e.to_string())
            }
            Error::SizeLimit { size, limit } => {
                tracing::warn!("Rejected upload of {} bytes (limit {})", size, limit);
                Self::too_large(limit)
            }
            Error::Provider { provider, source } => {
                tracing::error!("{} provider error: {}", provider, source);
                Self::BadGateway(format!(
                    "The {} provider failed to produce a summary. Please try again later.",
                    provider
                ))
            }
            other => {
                tracing::error!("Unexpected error while summarizing: {:?}", other);
                Self::Internal(UNEXPECTED.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Error::from(err).into()
    }
}
