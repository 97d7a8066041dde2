//! Generic CRUD service behind the per-entity server functions

use super::response::{InputValidationError, ServerResponse, parse_input};
use crate::core::StoreRef;
use crate::models::{EntityInput, RecordMeta};
use crate::params::{ListParams, Page};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use store_object::{StoreError, TableMetadata};
use uuid::Uuid;

/// Payload of `<table>.delete`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Read the `id` of a get/update/delete input
pub fn parse_id(input: &Value) -> Result<Uuid, InputValidationError> {
    let id = input
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| InputValidationError::field("id", "Required"))?;
    Uuid::parse_str(id.trim()).map_err(|_| InputValidationError::field("id", "Invalid id"))
}

/// List, get, create, update and delete for one entity, over its store
pub struct EntityService<I: EntityInput> {
    store: StoreRef<I::Model>,
    _input: PhantomData<fn() -> I>,
}

impl<I: EntityInput> Clone for EntityService<I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _input: PhantomData,
        }
    }
}

impl<I: EntityInput> std::fmt::Debug for EntityService<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("table", &I::Model::table_name())
            .finish()
    }
}

impl<I: EntityInput> EntityService<I> {
    pub fn new(store: StoreRef<I::Model>) -> Self {
        Self {
            store,
            _input: PhantomData,
        }
    }

    pub fn store(&self) -> &StoreRef<I::Model> {
        &self.store
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<I::Model>, StoreError> {
        let pagination = params.pagination();
        let query = params.to_query::<I::Model>();
        let page_query = query.clone().paginate(&pagination);

        let (total, items) = tokio::try_join!(
            self.store.count_where(query),
            self.store.find(page_query),
        )?;
        Ok(Page::new(items, total, &pagination))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<I::Model>, StoreError> {
        self.store.get_by_id(&id).await
    }

    pub async fn create(&self, input: I) -> Result<I::Model, StoreError> {
        self.store.create(input.into_model(RecordMeta::fresh())).await
    }

    /// Replace the record's fields, keeping its id and creation time
    pub async fn update(&self, id: Uuid, input: I) -> Result<I::Model, StoreError> {
        let existing = self.store.get_by_id(&id).await?.ok_or_else(|| {
            StoreError::NotFound(format!("{} record {} not found", I::Model::table_name(), id))
        })?;
        let meta = RecordMeta::updating(&existing);
        self.store.update(&id, input.into_model(meta)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(&id).await
    }

    pub async fn handle_list(&self, input: Value) -> ServerResponse<Page<I::Model>> {
        let params = ListParams::from_value(&input);
        respond(I::Model::table_name(), "list", self.list(&params).await)
    }

    pub async fn handle_get(&self, input: Value) -> ServerResponse<Option<I::Model>> {
        let id = match parse_id(&input) {
            Ok(id) => id,
            Err(errors) => return errors.into(),
        };
        respond(I::Model::table_name(), "get", self.get(id).await)
    }

    pub async fn handle_create(&self, input: Value) -> ServerResponse<I::Model> {
        let input = match parse_input::<I>(input) {
            Ok(input) => input,
            Err(errors) => return errors.into(),
        };
        respond(I::Model::table_name(), "create", self.create(input).await)
    }

    /// Input is `{ "id": ..., "data": <entity input> }`
    pub async fn handle_update(&self, mut input: Value) -> ServerResponse<I::Model> {
        let id = match parse_id(&input) {
            Ok(id) => id,
            Err(errors) => return errors.into(),
        };
        let data = input
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null);
        let data = match parse_input::<I>(data) {
            Ok(data) => data,
            Err(errors) => return errors.into(),
        };
        respond(I::Model::table_name(), "update", self.update(id, data).await)
    }

    pub async fn handle_delete(&self, input: Value) -> ServerResponse<Deleted> {
        let id = match parse_id(&input) {
            Ok(id) => id,
            Err(errors) => return errors.into(),
        };
        respond(
            I::Model::table_name(),
            "delete",
            self.delete(id).await.map(|deleted| Deleted { deleted }),
        )
    }
}

fn respond<T>(table: &str, operation: &str, result: Result<T, StoreError>) -> ServerResponse<T> {
    if let Err(error) = &result {
        tracing::warn!(table, operation, %error, "server function failed");
    }
    ServerResponse::from_result(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Stall, StallInput, StallStatus};
    use serde_json::json;
    use std::sync::Arc;
    use store_object::MemoryStore;

    fn service() -> EntityService<StallInput> {
        EntityService::new(Arc::new(MemoryStore::<Stall>::default()))
    }

    fn stall_input(name: &str, rate: i64) -> Value {
        json!({ "name": name, "barn": "North Barn", "monthlyRateCents": rate })
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_refreshes_timestamp() {
        let service = service();
        let created = match service.handle_create(stall_input("N1", 40_000)).await {
            ServerResponse::Data(stall) => stall,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(created.status, StallStatus::Available);

        let updated = service
            .handle_update(json!({
                "id": created.id.to_string(),
                "data": { "name": "N1", "barn": "North Barn", "monthlyRateCents": 42_000, "status": "occupied" }
            }))
            .await
            .into_result()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.monthly_rate_cents, 42_000);
        assert_eq!(updated.status, StallStatus::Occupied);
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_an_error() {
        let response = service()
            .handle_update(json!({ "id": Uuid::new_v4().to_string(), "data": stall_input("X", 1) }))
            .await;
        assert!(matches!(response, ServerResponse::Error(message) if message.contains("not found")));
    }

    #[tokio::test]
    async fn test_malformed_id_is_a_validation_error() {
        let service = service();
        for response in [
            service.handle_get(json!({ "id": "nope" })).await.map(|_| ()),
            service.handle_get(json!({})).await.map(|_| ()),
            service.handle_delete(json!({ "id": 7 })).await.map(|_| ()),
        ] {
            match response {
                ServerResponse::InputValidationError(errors) => {
                    assert!(errors.field_errors.contains_key("id"))
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_negative_rate_writes_nothing() {
        let service = service();
        let response = service.handle_create(stall_input("N1", -5)).await;
        match response {
            ServerResponse::InputValidationError(errors) => {
                assert_eq!(errors.field_errors["monthlyRateCents"], vec!["Monthly rate cannot be negative"])
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(service.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_pages_and_counts() {
        let service = service();
        for i in 0..12 {
            service
                .handle_create(stall_input(&format!("Stall {:02}", i), 1_000 * i))
                .await
                .into_result()
                .unwrap();
        }

        let page = service
            .list(&ListParams::from_value(&json!({ "page": 2, "pageSize": 5, "sort": "name", "order": "asc" })))
            .await
            .unwrap();
        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
        let names: Vec<_> = page.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Stall 05", "Stall 06", "Stall 07", "Stall 08", "Stall 09"]);
    }
}
