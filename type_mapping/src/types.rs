//! Type mapping definitions
//!
//! This module provides the column metadata shared between the derive macro and the
//! stores, plus the runtime value type bound into PostgreSQL queries.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// PostgreSQL column types supported by stablehaus models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Uuid,
    Text,
    Integer,
    BigInt,
    Double,
    Boolean,
    Date,
    Timestamp,
    Json,
    TextArray,
}

impl ColumnType {
    /// DDL type name
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "UUID",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP WITH TIME ZONE",
            ColumnType::Json => "JSONB",
            ColumnType::TextArray => "TEXT[]",
        }
    }

    /// Whether values of this type order meaningfully with < and >
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ColumnType::Json | ColumnType::TextArray | ColumnType::Boolean)
    }
}

/// Static description of one table column, generated by `#[derive(TableMetadata)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// SQL column name (the Rust field name)
    pub name: &'static str,
    /// Key used for this column in the serialized model
    pub json_key: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Included in free-text search
    pub searchable: bool,
    /// Target of from/to date range filters
    pub date_filter: bool,
    /// Target of the status filter
    pub status: bool,
}

impl ColumnDef {
    /// Column definition fragment for CREATE TABLE
    pub fn ddl(&self) -> String {
        let mut ddl = format!("{} {}", self.name, self.column_type.sql_type());
        if self.primary_key {
            ddl.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            ddl.push_str(" NOT NULL");
        }
        ddl
    }

    /// Whether `field` names this column by SQL name or JSON key
    pub fn matches(&self, field: &str) -> bool {
        self.name == field || self.json_key == field
    }
}

/// Runtime values bound into PostgreSQL statements and carried in event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostgresValue {
    Text(String),
    Integer(i32),
    BigInt(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Date(chrono::NaiveDate),
    Timestamp(chrono::DateTime<chrono::Utc>),
    Json(serde_json::Value),
    TextArray(Vec<String>),
    /// Typed NULL so the bind keeps the column's type
    Null(ColumnType),
}

impl PostgresValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PostgresValue::Null(_))
    }
}

/// Errors raised while converting values into column types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeMappingError {
    #[error("column {column}: expected {expected}, got {found}")]
    Mismatch {
        column: String,
        expected: &'static str,
        found: String,
    },
    #[error("column {0} does not accept null")]
    NotNullable(String),
}

impl From<String> for PostgresValue {
    fn from(val: String) -> Self {
        PostgresValue::Text(val)
    }
}

impl From<&str> for PostgresValue {
    fn from(val: &str) -> Self {
        PostgresValue::Text(val.to_string())
    }
}

impl From<i32> for PostgresValue {
    fn from(val: i32) -> Self {
        PostgresValue::Integer(val)
    }
}

impl From<i64> for PostgresValue {
    fn from(val: i64) -> Self {
        PostgresValue::BigInt(val)
    }
}

impl From<bool> for PostgresValue {
    fn from(val: bool) -> Self {
        PostgresValue::Boolean(val)
    }
}

impl From<Uuid> for PostgresValue {
    fn from(val: Uuid) -> Self {
        PostgresValue::Uuid(val)
    }
}

impl From<chrono::NaiveDate> for PostgresValue {
    fn from(val: chrono::NaiveDate) -> Self {
        PostgresValue::Date(val)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for PostgresValue {
    fn from(val: chrono::DateTime<chrono::Utc>) -> Self {
        PostgresValue::Timestamp(val)
    }
}

impl From<serde_json::Value> for PostgresValue {
    fn from(val: serde_json::Value) -> Self {
        PostgresValue::Json(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &'static str, column_type: ColumnType) -> ColumnDef {
        ColumnDef {
            name,
            json_key: name,
            column_type,
            nullable: false,
            primary_key: false,
            searchable: false,
            date_filter: false,
            status: false,
        }
    }

    #[test]
    fn test_ddl_fragments() {
        let mut id = column("id", ColumnType::Uuid);
        id.primary_key = true;
        assert_eq!(id.ddl(), "id UUID PRIMARY KEY");

        let name = column("name", ColumnType::Text);
        assert_eq!(name.ddl(), "name TEXT NOT NULL");

        let mut notes = column("notes", ColumnType::Text);
        notes.nullable = true;
        assert_eq!(notes.ddl(), "notes TEXT");

        let born = column("date_of_birth", ColumnType::Date);
        assert_eq!(born.ddl(), "date_of_birth DATE NOT NULL");
    }

    #[test]
    fn test_column_matches_sql_name_and_json_key() {
        let mut born = column("date_of_birth", ColumnType::Date);
        born.json_key = "dateOfBirth";
        assert!(born.matches("date_of_birth"));
        assert!(born.matches("dateOfBirth"));
        assert!(!born.matches("dob"));
    }
}
