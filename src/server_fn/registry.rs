//! Name-addressed registry of server functions
//!
//! Functions take and return JSON so they can be called in process, from the
//! query client, or over HTTP with the same semantics.

use super::response::ServerResponse;
use super::service::EntityService;
use crate::models::EntityInput;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use store_object::{StoreError, TableMetadata};

pub type ServerFn = Arc<dyn Fn(Value) -> BoxFuture<'static, ServerResponse<Value>> + Send + Sync>;

/// Dumps every row of one table as JSON
pub type TableRows = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<Value>, StoreError>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ServerFunctions {
    functions: HashMap<String, ServerFn>,
    tables: BTreeMap<String, TableRows>,
}

impl std::fmt::Debug for ServerFunctions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerFunctions")
            .field("functions", &self.names())
            .field("tables", &self.table_names())
            .finish()
    }
}

impl ServerFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any previous function of that name
    pub fn register<F, Fut, T>(&mut self, name: &str, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ServerResponse<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        crate::debug_log!(name, "registering server function");
        let function: ServerFn = Arc::new(move |input| {
            let response = f(input);
            async move { response.await.into_json() }.boxed()
        });
        self.functions.insert(name.to_string(), function);
    }

    /// Register `<table>.list/get/create/update/delete` for one entity and expose its table
    pub fn register_entity<I: EntityInput>(&mut self, service: EntityService<I>) {
        let table = I::Model::table_name();

        let list = service.clone();
        self.register(&format!("{}.list", table), move |input| {
            let service = list.clone();
            async move { service.handle_list(input).await }
        });

        let get = service.clone();
        self.register(&format!("{}.get", table), move |input| {
            let service = get.clone();
            async move { service.handle_get(input).await }
        });

        let create = service.clone();
        self.register(&format!("{}.create", table), move |input| {
            let service = create.clone();
            async move { service.handle_create(input).await }
        });

        let update = service.clone();
        self.register(&format!("{}.update", table), move |input| {
            let service = update.clone();
            async move { service.handle_update(input).await }
        });

        let delete = service.clone();
        self.register(&format!("{}.delete", table), move |input| {
            let service = delete.clone();
            async move { service.handle_delete(input).await }
        });

        let store = service.store().clone();
        self.register_table(table, move || {
            let store = store.clone();
            async move {
                let records = store.list_all().await?;
                records
                    .iter()
                    .map(|record| record.to_record().map(Value::Object))
                    .collect::<Result<Vec<_>, StoreError>>()
            }
        });
    }

    /// Expose a table to the development data viewer
    pub fn register_table<F, Fut>(&mut self, table: &str, rows: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Value>, StoreError>> + Send + 'static,
    {
        let rows: TableRows = Arc::new(move || rows().boxed());
        self.tables.insert(table.to_string(), rows);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke a function by name; `None` when no such function is registered
    pub async fn call(&self, name: &str, input: Value) -> Option<ServerResponse<Value>> {
        let function = self.functions.get(name)?.clone();
        crate::trace_log!(name, "calling server function");
        Some(function(input).await)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Every row of a registered table; `None` for unknown tables
    pub async fn table_rows(&self, table: &str) -> Option<Result<Vec<Value>, StoreError>> {
        let rows = self.tables.get(table)?.clone();
        Some(rows().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Horse, HorseInput};
    use serde_json::json;
    use store_object::MemoryStore;

    fn functions() -> ServerFunctions {
        let mut functions = ServerFunctions::new();
        functions.register_entity(EntityService::<HorseInput>::new(Arc::new(
            MemoryStore::<Horse>::default(),
        )));
        functions
    }

    #[tokio::test]
    async fn test_entity_functions_are_named_after_the_table() {
        let functions = functions();
        assert_eq!(
            functions.names(),
            vec!["horses.create", "horses.delete", "horses.get", "horses.list", "horses.update"]
        );
        assert_eq!(functions.table_names(), vec!["horses"]);
        assert!(functions.call("horses.fly", json!({})).await.is_none());
        assert!(functions.table_rows("unicorns").await.is_none());
    }

    #[tokio::test]
    async fn test_registered_function_answers_json() {
        let mut functions = ServerFunctions::new();
        functions.register("math.double", |input: Value| async move {
            match input.as_i64() {
                Some(n) => ServerResponse::Data(n * 2),
                None => ServerResponse::Error("expected a number".to_string()),
            }
        });

        assert_eq!(
            functions.call("math.double", json!(21)).await,
            Some(ServerResponse::Data(json!(42)))
        );
        assert_eq!(
            functions.call("math.double", json!("x")).await,
            Some(ServerResponse::Error("expected a number".to_string()))
        );
    }

    #[tokio::test]
    async fn test_table_rows_are_serialized_records() {
        let functions = functions();
        functions
            .call(
                "horses.create",
                json!({ "name": "Star", "breed": "Arabian", "dateOfBirth": "2020-01-01", "gender": "mare", "color": "bay" }),
            )
            .await
            .unwrap()
            .into_result()
            .unwrap();

        let rows = functions.table_rows("horses").await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Star");
        assert_eq!(rows[0]["dateOfBirth"], "2020-01-01");
    }
}
