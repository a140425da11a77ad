//! Error types for the metrics core

use spazio_common::SpazioError;
use thiserror::Error;

/// Main error type for metrics operations
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Malformed or out-of-range input, rejected before any ledger write
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Caller is not allowed to perform the mutation
    #[error("Authorization error: {message}")]
    Authorization { message: String },

    /// Mutation conflicts with existing ledger state
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Referenced entity does not exist
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Ledger operation failed (unreachable store, timeout, bad response)
    #[error("Ledger error during {operation}: {details}")]
    Ledger { operation: String, details: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MetricsError>;

impl SpazioError for MetricsError {}

impl MetricsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            MetricsError::Validation { .. } => "SPAZIO_METRICS_VALIDATION_ERROR",
            MetricsError::Authorization { .. } => "SPAZIO_METRICS_AUTHZ_ERROR",
            MetricsError::Conflict { .. } => "SPAZIO_METRICS_CONFLICT",
            MetricsError::NotFound { .. } => "SPAZIO_METRICS_NOT_FOUND",
            MetricsError::Ledger { .. } => "SPAZIO_METRICS_LEDGER_ERROR",
            MetricsError::Serialization(_) => "SPAZIO_METRICS_SERIALIZATION_ERROR",
        }
    }

    /// Check if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MetricsError::Validation { .. }
                | MetricsError::Authorization { .. }
                | MetricsError::Conflict { .. }
                | MetricsError::NotFound { .. }
        )
    }

    /// Check if retrying the operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, MetricsError::Ledger { .. })
    }
}
