//! In-process store
//!
//! Keeps records in insertion order behind a `tokio::sync::RwLock` and runs
//! queries with `QueryEvaluator`, mirroring what `GenericStore` does in SQL.

use super::core::emit_record_event;
use crate::errors::StoreError;
use crate::query_builder::{QueryBuilder, QueryEvaluator};
use crate::traits::{StoreObject, TableMetadata};
use async_trait::async_trait;
use serde_json::{Map, Value};
use signal_system::{EventType, SignalManager};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct MemoryStore<T: TableMetadata> {
    records: Arc<RwLock<Vec<T>>>,
    signal_manager: Option<Arc<SignalManager>>,
}

impl<T: TableMetadata> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            signal_manager: self.signal_manager.clone(),
        }
    }
}

impl<T: TableMetadata> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("table", &T::table_name())
            .field("has_signals", &self.signal_manager.is_some())
            .finish()
    }
}

impl<T: TableMetadata> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: TableMetadata> MemoryStore<T> {
    pub fn new(signal_manager: Option<Arc<SignalManager>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            signal_manager,
        }
    }

    fn emit_signal(&self, event_type: EventType, record: &T) {
        if let Some(signal_manager) = &self.signal_manager {
            emit_record_event(signal_manager, event_type, record);
        }
    }

    /// Records matching the query's conditions, ordered, before limit/offset
    async fn matching(
        &self,
        query: &QueryBuilder,
    ) -> Result<Vec<(Map<String, Value>, T)>, StoreError> {
        let order_columns = QueryEvaluator::order_columns::<T>(query)?;
        let records = self.records.read().await;

        let mut matching = Vec::new();
        for record in records.iter() {
            let serialized = record.to_record()?;
            if QueryEvaluator::matches::<T>(query, &serialized)? {
                matching.push((serialized, record.clone()));
            }
        }

        if !order_columns.is_empty() {
            // Stable sort keeps insertion order for ties
            matching.sort_by(|(a, _), (b, _)| QueryEvaluator::compare(&order_columns, a, b));
        }

        Ok(matching)
    }

    fn not_found(id: &Uuid) -> StoreError {
        StoreError::NotFound(format!("{} record {} not found", T::table_name(), id))
    }
}

#[async_trait]
impl<T: TableMetadata> StoreObject for MemoryStore<T> {
    type Model = T;

    async fn create(&self, data: Self::Model) -> Result<Self::Model, StoreError> {
        // Round-trip through JSON so stored records match what a database returns
        let created = T::from_record(Value::Object(data.to_record()?))?;
        let id = created.extract_id();

        {
            let mut records = self.records.write().await;
            if records.iter().any(|r| r.extract_id() == id) {
                return Err(StoreError::Conflict(format!(
                    "{} record {} already exists",
                    T::table_name(),
                    id
                )));
            }
            records.push(created.clone());
        }

        self.emit_signal(EventType::Create, &created);
        Ok(created)
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Self::Model>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.extract_id() == *id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Self::Model>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn update(&self, id: &Uuid, data: Self::Model) -> Result<Self::Model, StoreError> {
        let updated = data.with_id(*id)?;

        {
            let mut records = self.records.write().await;
            let slot = records
                .iter_mut()
                .find(|r| r.extract_id() == *id)
                .ok_or_else(|| Self::not_found(id))?;
            *slot = updated.clone();
        }

        self.emit_signal(EventType::Update, &updated);
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
        let removed = {
            let mut records = self.records.write().await;
            let index = records.iter().position(|r| r.extract_id() == *id);
            index.map(|index| records.remove(index))
        };

        match removed {
            Some(record) => {
                self.emit_signal(EventType::Delete, &record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn find(&self, query: QueryBuilder) -> Result<Vec<Self::Model>, StoreError> {
        let offset = query.offset_value().unwrap_or(0).max(0) as usize;
        let limit = query
            .limit_value()
            .map(|l| l.max(0) as usize)
            .unwrap_or(usize::MAX);

        Ok(self
            .matching(&query)
            .await?
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record)
            .collect())
    }

    async fn count_where(&self, query: QueryBuilder) -> Result<i64, StoreError> {
        Ok(self.matching(&query.without_limits()).await?.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::{Pagination, QueryFilter, SortOrder};
    use crate::test_models::{Stall, StallStatus};
    use serde_json::json;
    use std::sync::Mutex;

    async fn seeded() -> MemoryStore<Stall> {
        let store = MemoryStore::default();
        for (name, barn, status, rate) in [
            ("North 1", "North Barn", StallStatus::Available, 40_000),
            ("North 2", "North Barn", StallStatus::Occupied, 45_000),
            ("South 1", "South Barn", StallStatus::Occupied, 50_000),
            ("South 2", "South Barn", StallStatus::Maintenance, 30_000),
        ] {
            store
                .create(Stall::sample(name, barn, status, rate))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let store = MemoryStore::<Stall>::default();
        let stall = Stall::sample("Corner", "East Barn", StallStatus::Available, 42_000);

        let created = store.create(stall.clone()).await.unwrap();
        assert_eq!(created, stall);
        assert_eq!(store.get_by_id(&stall.id).await.unwrap(), Some(stall.clone()));

        let mut changed = stall.clone();
        changed.status = StallStatus::Occupied;
        let updated = store.update(&stall.id, changed.clone()).await.unwrap();
        assert_eq!(updated.status, StallStatus::Occupied);

        assert!(store.delete(&stall.id).await.unwrap());
        assert!(!store.delete(&stall.id).await.unwrap());
        assert_eq!(store.get_by_id(&stall.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::<Stall>::default();
        let stall = Stall::sample("Ghost", "Nowhere", StallStatus::Available, 1);
        let err = store.update(&stall.id, stall.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_path_id() {
        let store = MemoryStore::<Stall>::default();
        let stall = store
            .create(Stall::sample("A", "B", StallStatus::Available, 1))
            .await
            .unwrap();

        // Body carries a different id; the stored record keeps the original one
        let other = Stall::sample("A2", "B", StallStatus::Available, 2);
        let updated = store.update(&stall.id, other).await.unwrap();
        assert_eq!(updated.id, stall.id);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = MemoryStore::<Stall>::default();
        let stall = Stall::sample("A", "B", StallStatus::Available, 1);
        store.create(stall.clone()).await.unwrap();
        assert!(matches!(
            store.create(stall).await.unwrap_err(),
            StoreError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_find_filters_orders_and_paginates() {
        let store = seeded().await;

        let query = QueryBuilder::new()
            .filter(QueryFilter::or(vec![
                QueryFilter::ilike("name", "%north%"),
                QueryFilter::ilike("barn", "%north%"),
            ]))
            .order_by("monthlyRateCents", SortOrder::Desc);
        let names: Vec<_> = store
            .find(query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["North 2", "North 1"]);

        let page = QueryBuilder::new()
            .order_by("name", SortOrder::Asc)
            .paginate(&Pagination::new(2, 3));
        let names: Vec<_> = store
            .find(page.clone())
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["South 2"]);
        assert_eq!(store.count_where(page).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_count_where_and_find_one() {
        let store = seeded().await;

        let occupied = QueryBuilder::new().filter(QueryFilter::eq("status", json!("occupied")));
        assert_eq!(store.count_where(occupied.clone()).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 4);

        let first = store
            .find_one(occupied.order_by("monthly_rate_cents", SortOrder::Asc))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.name, "North 2");

        let unknown = QueryBuilder::new().filter(QueryFilter::eq("colour", json!("bay")));
        assert!(store.find(unknown).await.is_err());
    }

    #[tokio::test]
    async fn test_mutations_emit_signals() {
        let signals = Arc::new(SignalManager::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        signals.add_callback(move |event| {
            sink.lock()
                .unwrap()
                .push((event.event_type, event.table_name.clone(), event.record_id));
        });

        let store = MemoryStore::<Stall>::new(Some(Arc::clone(&signals)));
        let stall = Stall::sample("A", "B", StallStatus::Available, 1);
        store.create(stall.clone()).await.unwrap();
        store.update(&stall.id, stall.clone()).await.unwrap();
        store.delete(&stall.id).await.unwrap();
        store.delete(&stall.id).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (EventType::Create, "stalls".to_string(), Some(stall.id)),
                (EventType::Update, "stalls".to_string(), Some(stall.id)),
                (EventType::Delete, "stalls".to_string(), Some(stall.id)),
            ]
        );
    }
}
