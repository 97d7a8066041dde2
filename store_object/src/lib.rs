//! Store Object - Core data access layer for StableHaus
//!
//! This crate provides the foundational types and traits for data access:
//! table metadata, the `StoreObject` trait, the query builder and two store
//! implementations (PostgreSQL and in-memory).

// Generated `TableMetadata` impls name paths through `::store_object`
extern crate self as store_object;

pub mod errors;
pub mod generic_store;
pub mod prelude;
pub mod query_builder;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_models;

pub use errors::StoreError;
pub use generic_store::{GenericStore, MemoryStore};
pub use query_builder::{Pagination, QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use traits::*;

pub use type_mapping;
pub use uuid::Uuid;

use sqlx::PgPool;

pub type DbPool = PgPool;
