//! Configuration for the Spazio API

use serde::{Deserialize, Serialize};
use spazio_common::ConfigLoader;
use spazio_metrics::MetricsConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    pub bind_address: SocketAddr,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            request_timeout_secs: 30,
        }
    }
}

/// Main configuration structure for the Spazio API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Metrics core configuration (cache backend, TTLs, pagination)
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl ConfigLoader<Config> for Config {
    fn env_prefix() -> &'static str {
        "SPAZIO_API_"
    }

    fn default_file() -> &'static str {
        "spazio-api.toml"
    }
}
