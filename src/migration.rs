//! Database migration functionality
//!
//! This module provides automatic table creation for the models managed by
//! StableHaus. Migrations only touch PostgreSQL; the memory backend has no
//! schema and skips them.

use crate::core::StableHaus;
use crate::errors::StableHausError;
use crate::models;
use store_object::traits::TableMetadata;

impl StableHaus {
    /// Automatically create table and indexes for a model
    /// If recreate is true, drops existing table first
    pub async fn auto_migrate<T: TableMetadata>(&self, recreate: bool) -> Result<(), StableHausError> {
        let Some(pool) = self.pool() else {
            crate::debug_log!(table = T::table_name(), "memory backend, skipping migration");
            return Ok(());
        };

        if recreate {
            let drop_sql = T::drop_table_sql();
            tracing::debug!(sql = %drop_sql, "dropping table");
            sqlx::query(&drop_sql).execute(pool).await?;
        }

        let create_table_sql = T::create_table_sql();
        tracing::debug!(sql = %create_table_sql, "creating table");
        sqlx::query(&create_table_sql).execute(pool).await?;

        for index_sql in T::create_indexes_sql() {
            tracing::debug!(sql = %index_sql, "creating index");
            sqlx::query(&index_sql).execute(pool).await?;
        }

        Ok(())
    }

    /// Create every table the application serves, plus the unique index on user emails
    pub async fn migrate_all(&self, recreate: bool) -> Result<(), StableHausError> {
        self.auto_migrate::<models::Boarder>(recreate).await?;
        self.auto_migrate::<models::Horse>(recreate).await?;
        self.auto_migrate::<models::Stall>(recreate).await?;
        self.auto_migrate::<models::Pasture>(recreate).await?;
        self.auto_migrate::<models::PastureRotation>(recreate).await?;
        self.auto_migrate::<models::Invoice>(recreate).await?;
        self.auto_migrate::<models::Payment>(recreate).await?;
        self.auto_migrate::<models::Budget>(recreate).await?;
        self.auto_migrate::<models::Event>(recreate).await?;
        self.auto_migrate::<models::Facility>(recreate).await?;
        self.auto_migrate::<models::MaintenanceTask>(recreate).await?;
        self.auto_migrate::<models::Staff>(recreate).await?;
        self.auto_migrate::<models::StaffShift>(recreate).await?;
        self.auto_migrate::<models::Visitor>(recreate).await?;
        self.auto_migrate::<models::Report>(recreate).await?;
        self.auto_migrate::<models::User>(recreate).await?;

        if let Some(pool) = self.pool() {
            sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_unique ON users (email)")
                .execute(pool)
                .await?;
        }

        tracing::info!(backend = ?self.backend(), "migrations complete");
        Ok(())
    }
}
