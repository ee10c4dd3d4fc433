//! Injected cache handle with JSON helpers and read-through.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;
use super::keys::CacheKey;
use super::remote::RedisCache;
use super::store::MemoryCache;

#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryCache::new(config.memory_capacity)))
    }

    /// Connects to the configured network cache, degrading to the in-process
    /// cache when none is configured or it cannot be reached in time.
    pub async fn connect(config: &CacheConfig) -> Self {
        let Some(url) = config.redis_url.as_deref() else {
            info!(
                target = "snapshare::cache",
                backend = "memory",
                "No network cache configured; using in-process cache"
            );
            return Self::in_memory(config);
        };

        match tokio::time::timeout(config.connect_timeout, RedisCache::connect(url)).await {
            Ok(Ok(redis)) => {
                info!(target = "snapshare::cache", backend = "redis", "Cache connected");
                Self::new(Arc::new(redis))
            }
            Ok(Err(err)) => {
                warn!(
                    target = "snapshare::cache",
                    error = %err,
                    fallback = "memory",
                    "Network cache unreachable; running degraded"
                );
                Self::in_memory(config)
            }
            Err(_) => {
                warn!(
                    target = "snapshare::cache",
                    timeout_ms = config.connect_timeout.as_millis() as u64,
                    fallback = "memory",
                    "Network cache connect timed out; running degraded"
                );
                Self::in_memory(config)
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn get_text(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        self.backend.get(&key.to_string()).await
    }

    pub async fn set_text(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.backend.set(&key.to_string(), value, ttl).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> Result<Option<T>, CacheError> {
        let rendered = key.to_string();
        let Some(raw) = self.backend.get(&rendered).await? else {
            counter!("snapshare_cache_miss_total", "family" => key.family()).increment(1);
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!("snapshare_cache_hit_total", "family" => key.family()).increment(1);
                Ok(Some(value))
            }
            Err(err) => {
                warn!(
                    target = "snapshare::cache",
                    key = %rendered,
                    error = %err,
                    "Discarding undecodable cache entry"
                );
                self.backend.delete(&rendered).await?;
                counter!("snapshare_cache_miss_total", "family" => key.family()).increment(1);
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let rendered = key.to_string();
        let raw = serde_json::to_string(value).map_err(|err| CacheError::Encode {
            key: rendered.clone(),
            message: err.to_string(),
        })?;
        self.backend.set(&rendered, &raw, ttl).await
    }

    pub async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        self.backend.delete(&key.to_string()).await?;
        counter!("snapshare_cache_invalidate_total", "family" => key.family()).increment(1);
        Ok(())
    }

    /// Returns the cached value or loads, stores and returns it.
    pub async fn read_through<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        load: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get_json(key).await? {
            return Ok(hit);
        }
        let value = load().await?;
        self.set_json(key, &value, ttl).await?;
        Ok(value)
    }

    /// Like [`Cache::read_through`], but an absent value is not cached.
    pub async fn read_through_optional<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        load: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        if let Some(hit) = self.get_json(key).await? {
            return Ok(Some(hit));
        }
        let Some(value) = load().await? else {
            return Ok(None);
        };
        self.set_json(key, &value, ttl).await?;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use uuid::Uuid;

    use super::*;
    use crate::cache::keys::ENTITY_CACHE_TTL;

    fn memory() -> Cache {
        Cache::in_memory(&CacheConfig {
            memory_capacity: NonZeroUsize::new(16).expect("non-zero"),
            ..CacheConfig::default()
        })
    }

    #[tokio::test]
    async fn missing_network_cache_degrades_to_memory() {
        let config = CacheConfig {
            redis_url: None,
            ..CacheConfig::default()
        };
        assert_eq!(Cache::connect(&config).await.backend_name(), "memory");
    }

    #[tokio::test]
    async fn unreachable_network_cache_degrades_to_memory() {
        let config = CacheConfig {
            redis_url: Some("redis://127.0.0.1:1/".to_string()),
            connect_timeout: Duration::from_millis(200),
            ..CacheConfig::default()
        };
        assert_eq!(Cache::connect(&config).await.backend_name(), "memory");
    }

    #[tokio::test]
    async fn read_through_loads_once() {
        let cache = memory();
        let key = CacheKey::PostsByUser(Uuid::new_v4());
        let mut loads = 0;

        for _ in 0..2 {
            let value: Vec<u32> = cache
                .read_through::<_, CacheError, _, _>(&key, ENTITY_CACHE_TTL, || {
                    loads += 1;
                    async { Ok(vec![1, 2]) }
                })
                .await
                .expect("read through");
            assert_eq!(value, vec![1, 2]);
        }
        assert_eq!(loads, 1);
    }

    #[tokio::test]
    async fn absent_values_are_not_cached() {
        let cache = memory();
        let key = CacheKey::User(Uuid::new_v4());

        let value: Option<String> = cache
            .read_through_optional::<_, CacheError, _, _>(&key, ENTITY_CACHE_TTL, || async {
                Ok(None)
            })
            .await
            .expect("read through");
        assert!(value.is_none());
        assert!(cache.get_text(&key).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn undecodable_entry_counts_as_miss() {
        let cache = memory();
        let key = CacheKey::User(Uuid::new_v4());
        cache
            .set_text(&key, "not json", ENTITY_CACHE_TTL)
            .await
            .expect("set");

        let value: Option<Vec<u8>> = cache.get_json(&key).await.expect("get");
        assert!(value.is_none());
        assert!(cache.get_text(&key).await.expect("get").is_none());
    }
}
