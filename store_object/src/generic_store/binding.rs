//! Binding typed values into sqlx statements

use crate::traits::TableMetadata;
use crate::StoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::types::Json;
use sqlx::Postgres;
use type_mapping::{json_to_postgres_value, ColumnDef, ColumnType, PostgresValue, TypeMappingError};
use uuid::Uuid;

pub(crate) type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Bind one value, keeping the column type for NULLs
pub(crate) fn bind_value(query: PgQuery<'_>, value: PostgresValue) -> PgQuery<'_> {
    match value {
        PostgresValue::Text(v) => query.bind(v),
        PostgresValue::Integer(v) => query.bind(v),
        PostgresValue::BigInt(v) => query.bind(v),
        PostgresValue::Float(v) => query.bind(v),
        PostgresValue::Boolean(v) => query.bind(v),
        PostgresValue::Uuid(v) => query.bind(v),
        PostgresValue::Date(v) => query.bind(v),
        PostgresValue::Timestamp(v) => query.bind(v),
        PostgresValue::Json(v) => query.bind(Json(v)),
        PostgresValue::TextArray(v) => query.bind(v),
        PostgresValue::Null(column_type) => match column_type {
            ColumnType::Uuid => query.bind(None::<Uuid>),
            ColumnType::Text => query.bind(None::<String>),
            ColumnType::Integer => query.bind(None::<i32>),
            ColumnType::BigInt => query.bind(None::<i64>),
            ColumnType::Double => query.bind(None::<f64>),
            ColumnType::Boolean => query.bind(None::<bool>),
            ColumnType::Date => query.bind(None::<NaiveDate>),
            ColumnType::Timestamp => query.bind(None::<DateTime<Utc>>),
            ColumnType::Json => query.bind(None::<Json<Value>>),
            ColumnType::TextArray => query.bind(None::<Vec<String>>),
        },
    }
}

pub(crate) fn bind_all(mut query: PgQuery<'_>, values: Vec<PostgresValue>) -> PgQuery<'_> {
    for value in values {
        query = bind_value(query, value);
    }
    query
}

/// Column values of a model in declaration order, checked against nullability
pub(crate) fn model_values<T: TableMetadata>(
    model: &T,
) -> Result<Vec<(&'static ColumnDef, PostgresValue)>, StoreError> {
    let record = model.to_record()?;

    T::columns()
        .iter()
        .map(|column| {
            let raw = record.get(column.json_key).unwrap_or(&Value::Null);
            let value = json_to_postgres_value(column.name, column.column_type, raw)?;
            if value.is_null() && !column.nullable {
                return Err(TypeMappingError::NotNullable(column.name.to_string()).into());
            }
            Ok((column, value))
        })
        .collect()
}
