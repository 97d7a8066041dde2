//! Trait definitions
//!
//! This module defines the table metadata trait implemented by every model.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Debug;
use type_mapping::{ColumnDef, ColumnType};
use uuid::Uuid;

use crate::StoreError;

/// Metadata about a model's table structure
///
/// This trait should be derived using the `#[model]` attribute macro, which
/// automatically includes all necessary derives.
///
/// ```ignore
/// use table_derive::model;
///
/// #[model]
/// #[table(name = "stalls")]
/// #[serde(rename_all = "camelCase")]
/// pub struct Stall {
///     #[primary_key]
///     pub id: Uuid,
///
///     #[field(searchable)]
///     pub name: String,
///
///     #[field(status)]
///     pub status: StallStatus,
///
///     pub monthly_rate_cents: i64,
/// }
/// ```
pub trait TableMetadata:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    /// The table name in the database
    fn table_name() -> &'static str;

    /// Every column, in declaration order
    fn columns() -> &'static [ColumnDef];

    /// Get the primary key field name
    fn primary_key_field() -> &'static str;

    /// Extract ID from model instance
    fn extract_id(&self) -> Uuid;

    /// Look up a column by SQL name or JSON key
    fn column(field: &str) -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|column| column.matches(field))
    }

    /// Like [`TableMetadata::column`], with an error naming the table for unknown fields
    fn require_column(field: &str) -> Result<&'static ColumnDef, StoreError> {
        Self::column(field).ok_or_else(|| StoreError::unknown_field(Self::table_name(), field))
    }

    fn primary_key_column() -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|column| column.primary_key)
    }

    /// Columns included in free-text search
    fn searchable_columns() -> Vec<&'static ColumnDef> {
        Self::columns().iter().filter(|c| c.searchable).collect()
    }

    /// Column targeted by from/to date filters
    fn date_filter_column() -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|c| c.date_filter)
    }

    /// Column targeted by the status filter
    fn status_column() -> Option<&'static ColumnDef> {
        Self::columns().iter().find(|c| c.status)
    }

    fn column_names() -> Vec<&'static str> {
        Self::columns().iter().map(|c| c.name).collect()
    }

    /// Serialize into a JSON object keyed by JSON key
    fn to_record(&self) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::SerializationError(format!(
                "{} did not serialize to an object: {}",
                Self::table_name(),
                other
            ))),
        }
    }

    /// Build a model from a JSON object keyed by JSON key
    fn from_record(record: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(record)?)
    }

    /// Copy of `self` with the primary key replaced
    fn with_id(&self, id: Uuid) -> Result<Self, StoreError> {
        let mut record = self.to_record()?;
        if let Some(pk) = Self::primary_key_column() {
            record.insert(pk.json_key.to_string(), Value::String(id.to_string()));
        }
        Self::from_record(Value::Object(record))
    }

    /// `jsonb_build_object(...)` expression that reads a row back in the model's JSON shape
    fn select_json_sql() -> String {
        let pairs: Vec<String> = Self::columns()
            .iter()
            .map(|column| format!("'{}', {}", column.json_key, column.name))
            .collect();
        format!("jsonb_build_object({})", pairs.join(", "))
    }

    /// Generate CREATE TABLE SQL statement
    fn create_table_sql() -> String {
        let columns: Vec<String> = Self::columns().iter().map(|c| c.ddl()).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            Self::table_name(),
            columns.join(", ")
        )
    }

    /// Generate DROP TABLE SQL statement
    fn drop_table_sql() -> String {
        format!("DROP TABLE IF EXISTS {}", Self::table_name())
    }

    /// Generate CREATE INDEX SQL statements for reference, date and status columns
    fn create_indexes_sql() -> Vec<String> {
        Self::columns()
            .iter()
            .filter(|c| {
                c.date_filter
                    || c.status
                    || (!c.primary_key && c.column_type == ColumnType::Uuid)
            })
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table} ({column})",
                    table = Self::table_name(),
                    column = c.name
                )
            })
            .collect()
    }
}
