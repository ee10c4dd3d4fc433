//! Snapshare cache layer.
//!
//! - [`Cache`] is the injected handle. It wraps a network backend (Redis) or
//!   the in-process LRU used when the network cache is unavailable.
//! - [`CacheKey`] names every cached value.
//! - [`InvalidationEngine`] applies the counter updates and invalidations
//!   that follow each mutation, as planned by [`MutationPlan`].

mod backend;
mod client;
mod config;
mod engine;
mod keys;
pub(crate) mod lock;
mod planner;
mod remote;
mod store;

pub use backend::{CacheBackend, CacheError};
pub use client::Cache;
pub use config::CacheConfig;
pub use engine::{EngineError, InvalidationEngine};
pub use keys::{CacheKey, ENTITY_CACHE_TTL, KeyShape};
pub use planner::{Mutation, MutationPlan, StoreAction};
pub use remote::RedisCache;
pub use store::MemoryCache;
