//! Generic store implementations
//!
//! `StoreObject` over PostgreSQL. Rows are read back as one JSONB object per
//! record (`jsonb_build_object`) and deserialized with serde, so models need no
//! sqlx derives.

use super::binding::{bind_all, bind_value, model_values};
use super::core::GenericStore;
use crate::errors::StoreError;
use crate::query_builder::{QueryBuilder, SqlGenerator};
use crate::traits::{StoreObject, TableMetadata};
use async_trait::async_trait;
use serde_json::Value;
use signal_system::EventType;
use sqlx::postgres::PgRow;
use sqlx::Row;
use type_mapping::PostgresValue;
use uuid::Uuid;

fn decode_record<T: TableMetadata>(row: &PgRow) -> Result<T, StoreError> {
    let record: Value = row.try_get("record")?;
    T::from_record(record)
}

#[async_trait]
impl<T> StoreObject for GenericStore<T>
where
    T: TableMetadata,
{
    type Model = T;

    async fn create(&self, data: Self::Model) -> Result<Self::Model, StoreError> {
        let values = model_values(&data)?;

        let columns: Vec<&str> = values.iter().map(|(c, _)| c.name).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("${}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {} AS record",
            T::table_name(),
            columns.join(", "),
            placeholders.join(", "),
            T::select_json_sql()
        );

        tracing::debug!(table = T::table_name(), "insert");
        let query = bind_all(sqlx::query(&sql), values.into_iter().map(|(_, v)| v).collect());
        let row = query.fetch_one(&self.db_pool).await?;
        let created = decode_record::<T>(&row)?;

        self.emit_signal(EventType::Create, &created);
        Ok(created)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Self::Model>, StoreError> {
        let sql = format!(
            "SELECT {} AS record FROM {} WHERE {} = $1",
            T::select_json_sql(),
            T::table_name(),
            T::primary_key_field()
        );

        let row = sqlx::query(&sql)
            .bind(*id)
            .fetch_optional(&self.db_pool)
            .await?;

        row.as_ref().map(decode_record::<T>).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Self::Model>, StoreError> {
        self.find(QueryBuilder::new()).await
    }

    async fn update(&self, id: &Uuid, data: Self::Model) -> Result<Self::Model, StoreError> {
        let values: Vec<_> = model_values(&data)?
            .into_iter()
            .filter(|(column, _)| !column.primary_key)
            .collect();

        let assignments: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ${}", column.name, i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {} AS record",
            T::table_name(),
            assignments.join(", "),
            T::primary_key_field(),
            values.len() + 1,
            T::select_json_sql()
        );

        tracing::debug!(table = T::table_name(), %id, "update");
        let query = bind_all(sqlx::query(&sql), values.into_iter().map(|(_, v)| v).collect());
        let row = bind_value(query, PostgresValue::Uuid(*id))
            .fetch_optional(&self.db_pool)
            .await?;

        let updated = match row {
            Some(row) => decode_record::<T>(&row)?,
            None => {
                return Err(StoreError::NotFound(format!(
                    "{} record {} not found",
                    T::table_name(),
                    id
                )))
            }
        };

        self.emit_signal(EventType::Update, &updated);
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 RETURNING {} AS record",
            T::table_name(),
            T::primary_key_field(),
            T::select_json_sql()
        );

        tracing::debug!(table = T::table_name(), %id, "delete");
        let row = sqlx::query(&sql)
            .bind(*id)
            .fetch_optional(&self.db_pool)
            .await?;

        match row {
            Some(row) => {
                let deleted = decode_record::<T>(&row)?;
                self.emit_signal(EventType::Delete, &deleted);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find(&self, query: QueryBuilder) -> Result<Vec<Self::Model>, StoreError> {
        let (sql, params) = SqlGenerator::build_select::<T>(&query)?;
        let values = params
            .iter()
            .map(|p| p.to_postgres_value())
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(table = T::table_name(), sql = %sql, "find");
        let rows = bind_all(sqlx::query(&sql), values)
            .fetch_all(&self.db_pool)
            .await?;

        rows.iter().map(decode_record::<T>).collect()
    }

    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError> {
        let (sql, params) = SqlGenerator::build_count::<T>(&query)?;
        let values = params
            .iter()
            .map(|p| p.to_postgres_value())
            .collect::<Result<Vec<_>, _>>()?;

        let row = bind_all(sqlx::query(&sql), values)
            .fetch_one(&self.db_pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }
}
