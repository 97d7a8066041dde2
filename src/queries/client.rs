//! Query client
//!
//! Runs `QueryOptions` through the response cache and invalidates cached
//! scopes when mutations succeed or stores report changes.

use super::errors::QueryError;
use super::key::QueryKey;
use crate::server_fn::ServerFunctions;
use cache_system::{CacheManager, CacheParams};
use config::CacheConfig;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use signal_system::{CallbackId, SignalManager, Subscription};
use std::future::Future;
use std::sync::Arc;

/// Scope of the dashboard overview, which depends on every table
pub const DASHBOARD_SCOPE: &str = "dashboard";

pub type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, QueryError>> + Send + Sync>;

/// Cache key plus the fetch that produces the value stored under it
pub struct QueryOptions<T> {
    pub key: QueryKey,
    pub fetch: FetchFn<T>,
}

impl<T> Clone for QueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T> std::fmt::Debug for QueryOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOptions").field("key", &self.key).finish()
    }
}

impl<T: 'static> QueryOptions<T> {
    pub fn new<F, Fut>(key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        Self {
            key,
            fetch: Arc::new(move || fetch().boxed()),
        }
    }

    /// Run the fetch, bypassing any cache
    pub async fn fetch(&self) -> Result<T, QueryError> {
        (self.fetch)().await
    }
}

/// Clones share one signal subscription, released when the last clone drops
#[derive(Debug, Clone)]
pub struct QueryClient {
    functions: Arc<ServerFunctions>,
    cache: CacheParams,
    subscription: Option<Arc<Subscription>>,
}

impl QueryClient {
    pub fn new(functions: Arc<ServerFunctions>, cache: CacheParams) -> Self {
        Self {
            functions,
            cache,
            subscription: None,
        }
    }

    /// Client over a private in-memory cache with default settings
    pub fn with_memory_cache(functions: Arc<ServerFunctions>) -> Self {
        let manager = Arc::new(CacheManager::memory(CacheConfig::default()));
        Self::new(functions, CacheParams::from_manager(manager))
    }

    pub fn functions(&self) -> &Arc<ServerFunctions> {
        &self.functions
    }

    pub fn cache(&self) -> &CacheParams {
        &self.cache
    }

    /// Cached value for the options' key, fetching and storing it on a miss
    ///
    /// Cache failures are logged and treated as misses.
    pub async fn fetch_query<T>(&self, options: &QueryOptions<T>) -> Result<T, QueryError>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let manager = &self.cache.manager;
        let scope = options.key.scope();
        let hash = manager.hash_query(&options.key);
        // Fixed before fetching: an invalidation during the fetch makes this entry unreachable
        let cache_key = manager.query_key(&self.cache.prefix, scope, &hash);

        match manager.get_entry::<T>(&cache_key).await {
            Ok(Some(hit)) => {
                crate::trace_log!(key = %options.key, "query cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(error) => tracing::warn!(scope, %error, "query cache lookup failed"),
        }

        let value = options.fetch().await?;

        if let Err(error) = manager.set_entry(&cache_key, &value, self.cache.ttl).await {
            tracing::warn!(scope, %error, "query cache store failed");
        }
        Ok(value)
    }

    /// Fetch several independent queries concurrently; each result stands alone
    pub async fn fetch_all<T>(&self, options: &[QueryOptions<T>]) -> Vec<Result<T, QueryError>>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        join_all(options.iter().map(|o| self.fetch_query(o))).await
    }

    /// Call a mutation server function; on success the scope is invalidated
    pub async fn mutate(&self, scope: &str, name: &str, input: Value) -> Result<Value, QueryError> {
        let response = self
            .functions
            .call(name, input)
            .await
            .ok_or_else(|| QueryError::UnknownFunction(name.to_string()))?;

        let data = response.into_result()?;
        self.invalidate(scope);
        Ok(data)
    }

    /// Make every cached query of `scope`, and the dashboard, stale
    pub fn invalidate(&self, scope: &str) {
        self.cache.manager.invalidate_scope(scope);
        if scope != DASHBOARD_SCOPE {
            self.cache.manager.invalidate_scope(DASHBOARD_SCOPE);
        }
    }

    /// Invalidate a table's scope whenever its store reports a mutation
    ///
    /// Replaces any earlier subscription of this client.
    pub fn subscribe(&mut self, signals: &Arc<SignalManager>) -> CallbackId {
        let manager = Arc::clone(&self.cache.manager);
        let subscription = signals.subscribe(move |event| {
            manager.invalidate_scope(&event.table_name);
            manager.invalidate_scope(DASHBOARD_SCOPE);
        });
        let id = subscription.id();
        self.subscription = Some(Arc::new(subscription));
        id
    }

    /// Stop following store signals; true if this client was subscribed
    pub fn unsubscribe(&mut self) -> bool {
        self.subscription.take().is_some()
    }
}
