//! Cache system for query response caching
//!
//! This crate provides a small key/value cache with an in-memory and a Redis
//! backend, plus scope-based invalidation for cached query results.

pub mod backend;
pub mod errors;
pub mod manager;
pub mod params;
pub mod prelude;

// Re-export centralized config
pub use config::{CacheBackendKind, CacheConfig};

pub use backend::{CacheBackend, MemoryCache, RedisCache};
pub use errors::CacheError;
pub use manager::CacheManager;
pub use params::CacheParams;
