//! Error conventions shared by all Spazio crates

use thiserror::Error;

/// Marker trait implemented by every service-level error type.
///
/// Gives call sites a uniform bound for error reporting without tying them to
/// a concrete service error enum.
pub trait SpazioError: std::error::Error + Send + Sync + 'static {}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to read configuration file: {path}")]
    FileRead { path: String },

    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    #[error("Invalid configuration value for {field}: {details}")]
    InvalidValue { field: String, details: String },
}

impl SpazioError for ConfigurationError {}
