//! Derived-result cache
//!
//! A TTL key-value layer in front of the aggregation engine. The backing
//! store is an injected trait object; without one every operation degrades to
//! a no-op/miss and the system stays fully correct, only slower. Backing
//! store failures are absorbed by [`service::CacheService`] and never fail a
//! business operation.

pub mod coherence;
pub mod keys;
pub mod redis;
pub mod service;
pub mod store;

pub use coherence::{CoherencePolicy, Invalidation};
pub use service::CacheService;
pub use store::{CacheError, CacheStore, MemoryCacheStore, NoOpCacheStore};

use crate::config::{CacheBackend, CacheConfig};
use std::sync::Arc;
use tracing::warn;

/// Build the configured backing store.
///
/// A misconfigured or unreachable Redis degrades to the no-op store so the
/// service comes up uncached instead of failing.
pub async fn build_store(config: &CacheConfig) -> Arc<dyn CacheStore> {
    match config.backend {
        CacheBackend::None => Arc::new(NoOpCacheStore),
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
        CacheBackend::Redis => {
            let Some(url) = config.redis_url.as_deref() else {
                warn!("cache backend is redis but redis_url is unset, running uncached");
                return Arc::new(NoOpCacheStore);
            };
            match redis::RedisCacheStore::connect(url).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!("failed to connect to redis ({e}), running uncached");
                    Arc::new(NoOpCacheStore)
                }
            }
        }
    }
}
