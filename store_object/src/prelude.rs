//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{StoreObject, TableMetadata};

// Error types
pub use crate::errors::StoreError;

// Store implementations
pub use crate::generic_store::{GenericStore, MemoryStore};

// Query building
pub use crate::query_builder::{Pagination, QueryBuilder, QueryFilter, SortOrder};

// Column metadata
pub use type_mapping::{ColumnDef, ColumnType};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::PgPool;
pub use uuid::Uuid;
