//! Error types for the Spazio API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use spazio_common::SpazioError;
use spazio_metrics::MetricsError;
use thiserror::Error;

/// Main error type for the Spazio API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] spazio_common::ConfigurationError),

    /// Error surfaced by the metrics core
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Malformed request that never reached the core
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

impl SpazioError for ApiError {}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Config(_) => "SPAZIO_API_CONFIG_ERROR",
            ApiError::Metrics(e) => e.error_code(),
            ApiError::BadRequest { .. } => "SPAZIO_API_BAD_REQUEST",
            ApiError::Internal { .. } => "SPAZIO_API_INTERNAL_ERROR",
        }
    }

    /// Check if retrying the request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Metrics(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Metrics(e) => match e {
                MetricsError::Validation { .. } => StatusCode::BAD_REQUEST,
                MetricsError::Authorization { .. } => StatusCode::FORBIDDEN,
                MetricsError::Conflict { .. } => StatusCode::CONFLICT,
                MetricsError::NotFound { .. } => StatusCode::NOT_FOUND,
                MetricsError::Ledger { .. } => StatusCode::BAD_GATEWAY,
                MetricsError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now(),
                "retryable": self.is_retryable(),
            }
        }));

        (status, body).into_response()
    }
}

/// Error response structure mirrored by clients
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetails {
    /// Stable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// ISO 8601 timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Whether the error is retryable
    pub retryable: bool,
}
