//! Unified type mapping between Rust types and PostgreSQL
//! This crate provides consistent mapping logic used across the stablehaus ecosystem:
//! column metadata emitted by `table-derive`, JSON-to-column value conversion used by
//! the stores, and event payload serialization used by the signal system.

pub mod serialize;
pub mod sql;
pub mod types;

pub use serialize::{
    json_to_postgres_value, parse_timestamp, serialize_to_postgres_payload,
};
pub use sql::{is_optional_type, rust_type_to_column_type, strip_option};
pub use types::{ColumnDef, ColumnType, PostgresValue, TypeMappingError};
