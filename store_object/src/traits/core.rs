//! Trait definitions
//!
//! This module defines the core trait for store operations.

use crate::traits::table_metadata::TableMetadata;
use crate::{QueryBuilder, StoreError};
use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

/// Common store operations for all entities
///
/// Object safe, so services can hold `Arc<dyn StoreObject<Model = T>>` and stay
/// agnostic of the backend.
#[async_trait]
pub trait StoreObject: Send + Sync + Debug {
    /// The model type that this store persists
    type Model: TableMetadata;

    /// Insert a new record and return it as stored
    async fn create(&self, data: Self::Model) -> Result<Self::Model, StoreError>;

    /// Get a record by its ID
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Self::Model>, StoreError>;

    /// List all records of this type
    async fn list_all(&self) -> Result<Vec<Self::Model>, StoreError>;

    /// Replace every non-key column of the record with `id`.
    ///
    /// Fails with [`StoreError::NotFound`] when no such record exists.
    async fn update(&self, id: &Uuid, data: Self::Model) -> Result<Self::Model, StoreError>;

    /// Delete a record by its ID, returning whether it existed
    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError>;

    /// Count total records of this type
    async fn count(&self) -> Result<i64, StoreError> {
        self.count_where(QueryBuilder::new()).await
    }

    /// Find records matching query conditions
    async fn find(&self, query: QueryBuilder) -> Result<Vec<Self::Model>, StoreError>;

    /// Find first record matching query conditions
    async fn find_one(&self, query: QueryBuilder) -> Result<Option<Self::Model>, StoreError> {
        let mut records = self.find(query.limit(1)).await?;
        Ok(records.pop())
    }

    /// Count records matching query conditions (limit and offset are ignored)
    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError>;
}
