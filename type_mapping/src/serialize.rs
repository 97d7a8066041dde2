//! Serialization utilities
//!
//! This module converts serialized model data into PostgresValue, either column by
//! column (for statement binding) or as a loose payload (for signal events).

use crate::types::{ColumnType, PostgresValue, TypeMappingError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn mismatch(column: &str, expected: &'static str, value: &Value) -> TypeMappingError {
    TypeMappingError::Mismatch {
        column: column.to_string(),
        expected,
        found: describe(value),
    }
}

/// Parse a timestamp, accepting RFC 3339 or a bare date (midnight UTC)
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert one JSON value into the PostgresValue bound for a column of `column_type`.
///
/// JSON null always becomes a typed NULL; nullability is checked by the caller.
pub fn json_to_postgres_value(
    column: &str,
    column_type: ColumnType,
    value: &Value,
) -> Result<PostgresValue, TypeMappingError> {
    if value.is_null() {
        return Ok(PostgresValue::Null(column_type));
    }

    match column_type {
        ColumnType::Uuid => value
            .as_str()
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
            .map(PostgresValue::Uuid)
            .ok_or_else(|| mismatch(column, "uuid", value)),
        ColumnType::Text => value
            .as_str()
            .map(|s| PostgresValue::Text(s.to_string()))
            .ok_or_else(|| mismatch(column, "text", value)),
        ColumnType::Integer => value
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(PostgresValue::Integer)
            .ok_or_else(|| mismatch(column, "integer", value)),
        ColumnType::BigInt => value
            .as_i64()
            .map(PostgresValue::BigInt)
            .ok_or_else(|| mismatch(column, "bigint", value)),
        ColumnType::Double => value
            .as_f64()
            .map(PostgresValue::Float)
            .ok_or_else(|| mismatch(column, "double", value)),
        ColumnType::Boolean => value
            .as_bool()
            .map(PostgresValue::Boolean)
            .ok_or_else(|| mismatch(column, "boolean", value)),
        ColumnType::Date => value
            .as_str()
            .and_then(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .or_else(|| parse_timestamp(s).map(|dt| dt.date_naive()))
            })
            .map(PostgresValue::Date)
            .ok_or_else(|| mismatch(column, "date", value)),
        ColumnType::Timestamp => value
            .as_str()
            .and_then(parse_timestamp)
            .map(PostgresValue::Timestamp)
            .ok_or_else(|| mismatch(column, "timestamp", value)),
        ColumnType::Json => Ok(PostgresValue::Json(value.clone())),
        ColumnType::TextArray => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(PostgresValue::TextArray)
                .ok_or_else(|| mismatch(column, "text array", value)),
            _ => Err(mismatch(column, "text array", value)),
        },
    }
}

/// Loose conversion using JSON serialization, for event payloads
pub fn serialize_to_postgres_payload<T: Serialize>(data: &T) -> HashMap<String, PostgresValue> {
    let mut payload = HashMap::new();

    if let Ok(Value::Object(map)) = serde_json::to_value(data) {
        for (key, value) in map {
            let postgres_value = match value {
                Value::String(s) => {
                    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
                        PostgresValue::Timestamp(dt.with_timezone(&Utc))
                    } else {
                        PostgresValue::Text(s)
                    }
                }
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        match i32::try_from(i) {
                            Ok(small) => PostgresValue::Integer(small),
                            Err(_) => PostgresValue::BigInt(i),
                        }
                    } else if let Some(f) = n.as_f64() {
                        PostgresValue::Float(f)
                    } else {
                        PostgresValue::Json(Value::Number(n))
                    }
                }
                Value::Bool(b) => PostgresValue::Boolean(b),
                Value::Null => PostgresValue::Null(ColumnType::Text),
                other => PostgresValue::Json(other),
            };
            payload.insert(key, postgres_value);
        }
    }

    payload
}
