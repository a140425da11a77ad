//! Cache access with failure absorption
//!
//! Business operations must never fail because the cache is down. Every
//! error from the backing store is logged and converted to a miss (reads)
//! or a no-op (writes and evictions).

use crate::cache::coherence::Invalidation;
use crate::cache::store::CacheStore;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Fetch and deserialize a cached value. Storage errors and undecodable
    /// entries both read as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cached entry undecodable, dropping it");
                if let Err(e) = self.store.delete(key).await {
                    warn!(key, error = %e, "failed to drop undecodable entry");
                }
                None
            }
        }
    }

    /// Serialize and store a value under the given TTL.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value for cache");
                return;
            }
        };
        if let Err(e) = self.store.set(key, raw, ttl).await {
            warn!(key, error = %e, "cache write failed");
        }
    }

    /// Issue a batch of evictions concurrently. Failures are logged and
    /// skipped; the remaining entries age out at their TTL.
    pub async fn apply(&self, invalidations: Vec<Invalidation>) {
        let tasks = invalidations.into_iter().map(|invalidation| {
            let store = Arc::clone(&self.store);
            async move {
                match invalidation {
                    Invalidation::Key(key) => {
                        if let Err(e) = store.delete(&key).await {
                            warn!(key, error = %e, "cache eviction failed");
                        }
                    }
                    Invalidation::Pattern(pattern) => match store.delete_by_pattern(&pattern).await
                    {
                        Ok(removed) => {
                            debug!(pattern, removed, "evicted cached entries by pattern")
                        }
                        Err(e) => warn!(pattern, error = %e, "cache pattern eviction failed"),
                    },
                }
            }
        });
        join_all(tasks).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::{MemoryCacheStore, NoOpCacheStore};
    use serde::Deserialize;

    const TTL: Duration = Duration::from_secs(60);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        total: u64,
    }

    fn memory_service() -> CacheService {
        CacheService::new(Arc::new(MemoryCacheStore::new()))
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let cache = memory_service();
        cache.set_json("user_rating_u1", &Payload { total: 7 }, TTL).await;
        assert_eq!(
            cache.get_json::<Payload>("user_rating_u1").await,
            Some(Payload { total: 7 })
        );
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_dropped() {
        let store = Arc::new(MemoryCacheStore::new());
        store
            .set("user_rating_u1", "not json".to_string(), TTL)
            .await
            .unwrap();

        let cache = CacheService::new(store.clone());
        assert_eq!(cache.get_json::<Payload>("user_rating_u1").await, None);
        assert_eq!(store.get("user_rating_u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_apply_evicts_keys_and_patterns() {
        let store = Arc::new(MemoryCacheStore::new());
        for key in ["average_score_s1", "top_rated_spaces_25", "top_rated_spaces_10"] {
            store.set(key, "{}".to_string(), TTL).await.unwrap();
        }

        let cache = CacheService::new(store.clone());
        cache
            .apply(vec![
                Invalidation::Key("average_score_s1".to_string()),
                Invalidation::Pattern("top_rated_spaces_*".to_string()),
            ])
            .await;

        for key in ["average_score_s1", "top_rated_spaces_25", "top_rated_spaces_10"] {
            assert_eq!(store.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_noop_store_reads_as_miss() {
        let cache = CacheService::new(Arc::new(NoOpCacheStore));
        cache.set_json("k", &Payload { total: 1 }, TTL).await;
        assert_eq!(cache.get_json::<Payload>("k").await, None);
    }
}
