//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_MEMORY_CAPACITY: usize = 10_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Network cache endpoint; `None` selects the in-process cache.
    pub redis_url: Option<String>,
    /// Entry limit for the in-process cache.
    pub memory_capacity: NonZeroUsize,
    /// Startup connect budget before falling back to the in-process cache.
    pub connect_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            memory_capacity: NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            redis_url: settings.redis_url.clone(),
            memory_capacity: settings.memory_capacity,
            connect_timeout: settings.connect_timeout,
        }
    }
}
