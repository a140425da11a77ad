//! Configuration loading conventions
//!
//! Every Spazio service loads its configuration the same way: serialized
//! defaults, merged with an optional TOML file, merged with prefixed
//! environment variables (double underscore as the section separator).

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Loader implemented by each service's root configuration struct.
pub trait ConfigLoader<T: Default + Serialize + DeserializeOwned + Clone> {
    /// Environment variable prefix, e.g. `SPAZIO_METRICS_`.
    fn env_prefix() -> &'static str;

    /// Default configuration file name looked up in the working directory.
    fn default_file() -> &'static str;

    fn load(path: Option<PathBuf>) -> Result<T, ConfigurationError> {
        let file = path.unwrap_or_else(|| PathBuf::from(Self::default_file()));
        Self::figment(&file)
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })
    }

    fn load_from_file(path: &Path) -> Result<T, ConfigurationError> {
        Self::figment(path)
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(T::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::env_prefix()).split("__"))
    }

    /// Serialize the default configuration as example TOML.
    fn generate_example() -> Result<String, ConfigurationError> {
        toml::to_string_pretty(&T::default()).map_err(|e| ConfigurationError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }
}
