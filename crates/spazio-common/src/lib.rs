//! Shared building blocks for Spazio services

pub mod config;
pub mod error;
pub mod logging;

pub use config::ConfigLoader;
pub use error::{ConfigurationError, SpazioError};
