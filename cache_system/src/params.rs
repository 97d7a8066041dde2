//! Cache parameter configuration
//!
//! This module defines the CacheParams struct
//! for configuring cache behavior and TTL settings.

use crate::CacheManager;
use std::sync::Arc;

/// Cache parameters for a consumer of the cache (TTL and key prefix)
#[derive(Debug, Clone)]
pub struct CacheParams {
    /// The cache manager instance
    pub manager: Arc<CacheManager>,
    /// TTL for cached entries in seconds, 0 disables caching
    pub ttl: u64,
    /// Prefix for cache keys
    pub prefix: String,
}

impl CacheParams {
    pub fn new(manager: Arc<CacheManager>, ttl: u64, prefix: &str) -> Self {
        Self {
            ttl,
            prefix: prefix.to_string(),
            manager,
        }
    }

    /// Parameters taken from the manager's own configuration
    pub fn from_manager(manager: Arc<CacheManager>) -> Self {
        let ttl = manager.config().default_ttl;
        let prefix = manager.config().key_prefix.clone();
        Self {
            manager,
            ttl,
            prefix,
        }
    }
}
