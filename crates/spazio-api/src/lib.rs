//! HTTP API for the Spazio metrics service
//!
//! A thin axum layer over [`spazio_metrics::MetricsFacade`]: request DTOs in,
//! facade calls, JSON out. All caching and invalidation lives below the
//! facade; handlers never touch the cache directly.

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use error::{ApiError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
