//! Configuration for the metrics core

use serde::{Deserialize, Serialize};
use spazio_common::ConfigLoader;
use std::time::Duration;

/// Cache backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// No backing store; every cache call is a no-op and reads always miss
    #[default]
    None,
    /// Process-local in-memory store
    Memory,
    /// Shared Redis store
    Redis,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Which backend to use
    pub backend: CacheBackend,

    /// Redis connection URL, required when backend = "redis"
    pub redis_url: Option<String>,

    /// TTL for short-lived facts (listings, metrics, rankings), seconds
    pub short_ttl_secs: u64,

    /// TTL for slower-moving facts (user rating), seconds
    pub slow_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::None,
            redis_url: None,
            short_ttl_secs: 300,
            slow_ttl_secs: 600,
        }
    }
}

impl CacheConfig {
    pub fn short_ttl(&self) -> Duration {
        Duration::from_secs(self.short_ttl_secs)
    }

    pub fn slow_ttl(&self) -> Duration {
        Duration::from_secs(self.slow_ttl_secs)
    }
}

/// Pagination defaults applied when a request omits page/limit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_page: u32,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Root configuration for the metrics core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MetricsConfig {
    pub cache: CacheConfig,
    pub pagination: PaginationConfig,
}

impl ConfigLoader<MetricsConfig> for MetricsConfig {
    fn env_prefix() -> &'static str {
        "SPAZIO_METRICS_"
    }

    fn default_file() -> &'static str {
        "spazio-metrics.toml"
    }
}
