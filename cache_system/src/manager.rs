//! Cache manager implementation
//!
//! This module provides the main CacheManager struct. Query results are stored
//! under `<prefix>:<scope>:g<generation>:query:<hash>`; bumping a scope's
//! generation makes every older entry for that scope unreachable at once.
//! Retired generations are deleted from the backend on the next write.

use crate::backend::{CacheBackend, MemoryCache, RedisCache};
use crate::errors::CacheError;
use config::{CacheBackendKind, CacheConfig};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Cache manager over a pluggable backend
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    config: Arc<CacheConfig>,
    generations: Arc<RwLock<HashMap<String, u64>>>,
    /// `(scope, generation)` pairs whose entries are still in the backend
    retired: Arc<Mutex<Vec<(String, u64)>>>,
    /// Key prefixes handed out by `query_key`
    prefixes: Arc<RwLock<HashSet<String>>>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .finish()
    }
}

impl CacheManager {
    /// Create a new cache manager using the backend named in the configuration
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::Memory => Arc::new(MemoryCache::new()),
            CacheBackendKind::Redis => Arc::new(RedisCache::new(&config.redis_url)?),
        };
        Ok(Self::with_backend(config, backend))
    }

    /// In-memory cache manager with the given configuration
    pub fn memory(config: CacheConfig) -> Self {
        Self::with_backend(config, Arc::new(MemoryCache::new()))
    }

    pub fn with_backend(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            generations: Arc::new(RwLock::new(HashMap::new())),
            retired: Arc::new(Mutex::new(Vec::new())),
            prefixes: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Current generation of a scope (0 until first invalidated)
    pub fn generation(&self, scope: &str) -> u64 {
        let generations = self.generations.read().unwrap_or_else(|e| e.into_inner());
        generations.get(scope).copied().unwrap_or(0)
    }

    /// Cache key for query results at the scope's current generation
    ///
    /// Callers that fetch between lookup and store should build the key once,
    /// before fetching, so a concurrent invalidation is never written over.
    pub fn query_key(&self, prefix: &str, scope: &str, query_hash: &str) -> String {
        self.remember_prefix(prefix);
        format!(
            "{}:{}:g{}:query:{}",
            prefix,
            scope,
            self.generation(scope),
            query_hash
        )
    }

    fn remember_prefix(&self, prefix: &str) {
        let known = self
            .prefixes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(prefix);
        if !known {
            self.prefixes
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(prefix.to_string());
        }
    }

    /// False for a query key built under a generation that has since been retired
    ///
    /// Keys not in the `<prefix>:<scope>:g<gen>:query:<hash>` shape count as current.
    pub fn is_current_key(&self, cache_key: &str) -> bool {
        let parts: Vec<&str> = cache_key.rsplitn(5, ':').collect();
        let [_hash, "query", generation, scope, _prefix] = parts.as_slice() else {
            return true;
        };
        match generation.strip_prefix('g').and_then(|g| g.parse::<u64>().ok()) {
            Some(generation) => generation == self.generation(scope),
            None => true,
        }
    }

    /// Delete backend entries of every retired generation
    async fn sweep_retired(&self) {
        let retired = std::mem::take(&mut *self.retired.lock().unwrap_or_else(|e| e.into_inner()));
        if retired.is_empty() {
            return;
        }
        let prefixes: Vec<String> = self
            .prefixes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();

        for (scope, generation) in retired {
            for prefix in &prefixes {
                let stale = format!("{}:{}:g{}:", prefix, scope, generation);
                if let Err(error) = self.backend.delete_prefix(&stale).await {
                    tracing::warn!(%error, key_prefix = %stale, "failed to sweep retired cache entries");
                }
            }
        }
    }

    /// Generate hash for query parameters
    pub fn hash_query<T: Hash>(&self, query: &T) -> String {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    /// Read a cached entry by full key
    pub async fn get_entry<T>(&self, cache_key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        match self.backend.get(cache_key).await? {
            Some(json_str) => {
                let value: T = serde_json::from_str(&json_str)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Store an entry by full key; a TTL of 0 skips caching
    ///
    /// Values keyed under a retired generation are dropped instead of stored.
    pub async fn set_entry<T>(&self, cache_key: &str, value: &T, ttl: u64) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        if ttl == 0 {
            return Ok(());
        }

        self.sweep_retired().await;
        if !self.is_current_key(cache_key) {
            tracing::debug!(cache_key, "skipped caching under a retired generation");
            return Ok(());
        }

        let json_str = serde_json::to_string(value)?;
        self.backend
            .set(cache_key, json_str, Duration::from_secs(ttl))
            .await
    }

    /// Get query results from cache
    pub async fn get_query<T>(
        &self,
        prefix: &str,
        scope: &str,
        query_hash: &str,
    ) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        self.get_entry(&self.query_key(prefix, scope, query_hash))
            .await
    }

    /// Set query results in cache; a TTL of 0 skips caching
    pub async fn set_query<T>(
        &self,
        prefix: &str,
        scope: &str,
        query_hash: &str,
        results: &T,
        ttl: u64,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_entry(&self.query_key(prefix, scope, query_hash), results, ttl)
            .await
    }

    /// Invalidate every cached query for a scope (when data changes)
    ///
    /// Takes effect immediately for subsequent lookups; the stale entries are
    /// deleted on the next [`CacheManager::set_entry`].
    pub fn invalidate_scope(&self, scope: &str) -> u64 {
        let generation = {
            let mut generations = self.generations.write().unwrap_or_else(|e| e.into_inner());
            let generation = generations.entry(scope.to_string()).or_insert(0);
            *generation += 1;
            *generation
        };
        self.retired
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((scope.to_string(), generation - 1));
        tracing::debug!(scope, generation, "invalidated query cache scope");
        generation
    }

    /// Remove stored entries of a scope from the backend
    pub async fn purge_scope(&self, prefix: &str, scope: &str) -> Result<u64, CacheError> {
        self.invalidate_scope(scope);
        self.backend
            .delete_prefix(&format!("{}:{}:", prefix, scope))
            .await
    }

    /// Drop every cached entry under a key prefix
    pub async fn clear(&self, prefix: &str) -> Result<u64, CacheError> {
        {
            let mut generations = self.generations.write().unwrap_or_else(|e| e.into_inner());
            for generation in generations.values_mut() {
                *generation += 1;
            }
        }
        self.backend.delete_prefix(&format!("{}:", prefix)).await
    }

    /// Ping the backend to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        self.backend.ping().await
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manager() -> CacheManager {
        CacheManager::memory(CacheConfig::default())
    }

    #[tokio::test]
    async fn test_set_and_get_query() {
        let cache = manager();
        let hash = cache.hash_query(&("page", 1));

        cache
            .set_query("app", "horses", &hash, &json!({"items": [1, 2]}), 60)
            .await
            .unwrap();

        let cached: Option<serde_json::Value> =
            cache.get_query("app", "horses", &hash).await.unwrap();
        assert_eq!(cached, Some(json!({"items": [1, 2]})));
    }

    #[tokio::test]
    async fn test_invalidate_scope_hides_old_entries() {
        let cache = manager();
        let hash = cache.hash_query(&"all");

        cache.set_query("app", "horses", &hash, &1, 60).await.unwrap();
        cache.set_query("app", "stalls", &hash, &2, 60).await.unwrap();

        assert_eq!(cache.invalidate_scope("horses"), 1);

        let horses: Option<i32> = cache.get_query("app", "horses", &hash).await.unwrap();
        let stalls: Option<i32> = cache.get_query("app", "stalls", &hash).await.unwrap();
        assert_eq!(horses, None);
        assert_eq!(stalls, Some(2));
    }

    #[tokio::test]
    async fn test_zero_ttl_is_not_cached() {
        let cache = manager();
        cache.set_query("app", "horses", "h", &1, 0).await.unwrap();
        let cached: Option<i32> = cache.get_query("app", "horses", "h").await.unwrap();
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_purge_and_clear() {
        let cache = manager();
        cache.set_query("app", "horses", "a", &1, 60).await.unwrap();
        cache.set_query("app", "horses", "b", &2, 60).await.unwrap();
        cache.set_query("app", "stalls", "a", &3, 60).await.unwrap();

        assert_eq!(cache.purge_scope("app", "horses").await.unwrap(), 2);
        assert_eq!(cache.clear("app").await.unwrap(), 1);

        let stalls: Option<i32> = cache.get_query("app", "stalls", "a").await.unwrap();
        assert_eq!(stalls, None);
    }

    #[tokio::test]
    async fn test_key_taken_before_invalidation_is_never_read_again() {
        let cache = manager();
        let stale_key = cache.query_key("app", "horses", "h");
        cache.invalidate_scope("horses");

        cache.set_entry(&stale_key, &1, 60).await.unwrap();
        let current: Option<i32> = cache.get_query("app", "horses", "h").await.unwrap();
        assert_eq!(current, None);
        assert_eq!(cache.query_key("app", "horses", "h"), "app:horses:g1:query:h");
    }

    #[tokio::test]
    async fn test_repeated_invalidation_keeps_backend_bounded() {
        let backend = MemoryCache::new();
        let cache = CacheManager::with_backend(CacheConfig::default(), Arc::new(backend.clone()));
        let hash = cache.hash_query(&"all");

        for round in 0..1000 {
            let key = cache.query_key("app", "horses", &hash);
            cache.set_entry(&key, &round, 60).await.unwrap();
            cache.invalidate_scope("horses");
        }
        assert_eq!(backend.len().await, 1);

        cache.set_query("app", "stalls", &hash, &1, 60).await.unwrap();
        assert_eq!(backend.len().await, 1);
    }

    #[test]
    fn test_is_current_key() {
        let cache = manager();
        let key = cache.query_key("app", "horses", "h");
        assert!(cache.is_current_key(&key));

        cache.invalidate_scope("horses");
        assert!(!cache.is_current_key(&key));
        assert!(cache.is_current_key("app:horses:plain"));
    }

    #[test]
    fn test_hash_is_stable_for_equal_input() {
        let cache = manager();
        assert_eq!(cache.hash_query(&("a", 1)), cache.hash_query(&("a", 1)));
        assert_ne!(cache.hash_query(&("a", 1)), cache.hash_query(&("a", 2)));
    }
}
