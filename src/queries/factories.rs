//! Query-option factories
//!
//! Each factory pairs a deterministic cache key with a fetch that calls the
//! matching server function and decodes its payload.

use super::client::{DASHBOARD_SCOPE, QueryOptions};
use super::errors::QueryError;
use super::key::QueryKey;
use crate::dashboard::DashboardOverview;
use crate::models::Report;
use crate::params::{ListParams, Page};
use crate::reports::ReportRequest;
use crate::server_fn::ServerFunctions;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use store_object::TableMetadata;
use uuid::Uuid;

/// Call `name` and decode its payload; an absent payload decodes to `T::default()`
pub async fn call_function<T>(
    functions: &ServerFunctions,
    name: &str,
    input: Value,
) -> Result<T, QueryError>
where
    T: DeserializeOwned + Default,
{
    let response = functions
        .call(name, input)
        .await
        .ok_or_else(|| QueryError::UnknownFunction(name.to_string()))?;

    match response.into_result()? {
        Value::Null => Ok(T::default()),
        data => Ok(serde_json::from_value(data)?),
    }
}

fn options<T>(functions: &Arc<ServerFunctions>, key: QueryKey, name: String, input: Value) -> QueryOptions<T>
where
    T: DeserializeOwned + Default + Send + 'static,
{
    let functions = Arc::clone(functions);
    QueryOptions::new(key, move || {
        let functions = Arc::clone(&functions);
        let name = name.clone();
        let input = input.clone();
        async move { call_function::<T>(&functions, &name, input).await }
    })
}

fn to_input(params: &impl Serialize) -> Value {
    serde_json::to_value(params).unwrap_or_default()
}

/// One page of `T` for the given list parameters
pub fn list_query<T: TableMetadata>(
    functions: &Arc<ServerFunctions>,
    params: &ListParams,
) -> QueryOptions<Page<T>> {
    let table = T::table_name();
    let key = QueryKey::new(table, &json!({ "list": to_input(params) }));
    options(functions, key, format!("{}.list", table), to_input(params))
}

/// A single `T` by id, `None` when it does not exist
pub fn detail_query<T: TableMetadata>(
    functions: &Arc<ServerFunctions>,
    id: Uuid,
) -> QueryOptions<Option<T>> {
    let table = T::table_name();
    let key = QueryKey::new(table, &json!({ "detail": id }));
    options(functions, key, format!("{}.get", table), json!({ "id": id }))
}

pub fn report_query(functions: &Arc<ServerFunctions>, request: &ReportRequest) -> QueryOptions<Report> {
    let table = Report::table_name();
    let key = QueryKey::new(table, &json!({ "generate": to_input(request) }));
    options(functions, key, "reports.generate".to_string(), to_input(request))
}

pub fn dashboard_query(functions: &Arc<ServerFunctions>) -> QueryOptions<DashboardOverview> {
    let key = QueryKey::new(DASHBOARD_SCOPE, &json!({ "overview": true }));
    options(functions, key, "dashboard.overview".to_string(), json!({}))
}
