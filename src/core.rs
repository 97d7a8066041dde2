//! Core StableHaus functionality
//!
//! This module contains the main StableHaus struct: the storage backend (a
//! PostgreSQL pool or in-process memory), the shared signal manager and a
//! registry of one store per table.

use sqlx::PgPool;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use signal_system::SignalManager;
use store_object::traits::{StoreObject, TableMetadata};
use store_object::{GenericStore, MemoryStore};

use crate::errors::StableHausError;
use config::{AppConfig, DatabaseConfig, StorageBackend};

/// Shared handle to the store of one model
pub type StoreRef<T> = Arc<dyn StoreObject<Model = T>>;

/// Main StableHaus coordinator that owns the storage backend and store objects
pub struct StableHaus {
    pool: Option<PgPool>,
    signals: Arc<SignalManager>,
    stores: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for StableHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StableHaus")
            .field("backend", &self.backend())
            .field("stores", &self.list_stores())
            .finish()
    }
}

impl StableHaus {
    /// Create new StableHaus with database connection
    pub async fn new(config: DatabaseConfig) -> Result<Self, StableHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(host = %config.host, database = %config.database, "connected to postgres");

        Ok(Self {
            pool: Some(pool),
            signals: Arc::new(SignalManager::new()),
            stores: HashMap::new(),
        })
    }

    /// Create StableHaus backed by in-process memory stores
    pub fn in_memory() -> Self {
        Self {
            pool: None,
            signals: Arc::new(SignalManager::new()),
            stores: HashMap::new(),
        }
    }

    /// Create StableHaus for the storage backend named in the configuration
    pub async fn from_config(config: &AppConfig) -> Result<Self, StableHausError> {
        match config.storage.backend {
            StorageBackend::Memory => Ok(Self::in_memory()),
            StorageBackend::Postgres => Self::new(config.database.clone()).await,
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self.pool {
            Some(_) => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        }
    }

    /// Get database pool reference (postgres backend only)
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Signal manager every store created here reports mutations to
    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    /// Register the store for `T`, keyed by its table name
    pub fn register_store<T: TableMetadata>(
        &mut self,
        store: StoreRef<T>,
    ) -> Result<(), StableHausError> {
        let name = T::table_name();
        if self.stores.contains_key(name) {
            return Err(StableHausError::StoreAlreadyRegistered(name.to_string()));
        }

        crate::debug_log!(table = name, "registering store");
        self.stores.insert(name.to_string(), Box::new(store));
        Ok(())
    }

    /// Get the registered store for `T`
    pub fn get_store<T: TableMetadata>(&self) -> Result<StoreRef<T>, StableHausError> {
        self.stores
            .get(T::table_name())
            .and_then(|store| store.downcast_ref::<StoreRef<T>>())
            .cloned()
            .ok_or_else(|| StableHausError::StoreNotFound(T::table_name().to_string()))
    }

    /// Get the store for `T`, creating one on the configured backend if needed
    pub fn store<T: TableMetadata>(&mut self) -> Result<StoreRef<T>, StableHausError> {
        if self.stores.contains_key(T::table_name()) {
            return self.get_store::<T>();
        }

        let signals = Some(Arc::clone(&self.signals));
        let store: StoreRef<T> = match &self.pool {
            Some(pool) => Arc::new(GenericStore::<T>::new(pool.clone(), signals)),
            None => Arc::new(MemoryStore::<T>::new(signals)),
        };
        self.register_store::<T>(Arc::clone(&store))?;
        Ok(store)
    }

    /// List all registered store names
    pub fn list_stores(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.stores.keys().collect();
        names.sort();
        names
    }

    /// Remove a store object by table name
    pub fn unregister_store(&mut self, name: &str) -> Result<(), StableHausError> {
        self.stores
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StableHausError::StoreNotFound(name.to_string()))
    }

    /// Check database connection health; the memory backend is always healthy
    pub async fn health_check(&self) -> Result<(), StableHausError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").fetch_one(pool).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Horse, Stall};

    #[test]
    fn test_store_is_created_once_per_table() {
        let mut haus = StableHaus::in_memory();
        let first = haus.store::<Horse>().unwrap();
        let second = haus.store::<Horse>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(haus.list_stores(), vec!["horses"]);
        assert_eq!(haus.backend(), StorageBackend::Memory);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut haus = StableHaus::in_memory();
        haus.store::<Stall>().unwrap();
        let again: StoreRef<Stall> = Arc::new(MemoryStore::<Stall>::default());
        assert!(matches!(
            haus.register_store::<Stall>(again),
            Err(StableHausError::StoreAlreadyRegistered(name)) if name == "stalls"
        ));
    }

    #[test]
    fn test_missing_store_and_unregister() {
        let mut haus = StableHaus::in_memory();
        assert!(matches!(
            haus.get_store::<Horse>(),
            Err(StableHausError::StoreNotFound(_))
        ));
        haus.store::<Horse>().unwrap();
        haus.unregister_store("horses").unwrap();
        assert!(haus.unregister_store("horses").is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_is_healthy() {
        assert!(StableHaus::in_memory().health_check().await.is_ok());
    }
}
