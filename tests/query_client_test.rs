//! Integration tests for cached queries and their invalidation

use serde_json::json;
use stablehaus::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn memory_cache() -> CacheParams {
    CacheParams::from_manager(Arc::new(CacheManager::memory(CacheConfig::default())))
}

/// Options under `scope` whose fetch counts how often it ran
fn counting(scope: &str) -> (QueryOptions<usize>, Arc<AtomicUsize>) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let options = QueryOptions::new(QueryKey::new(scope, &json!({ "counted": true })), move || {
        let run = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Ok::<_, QueryError>(run) }
    });
    (options, runs)
}

fn star() -> serde_json::Value {
    json!({
        "name": "Star",
        "breed": "Arabian",
        "dateOfBirth": "2020-01-01",
        "gender": "mare",
        "color": "bay"
    })
}

#[tokio::test]
async fn test_cached_until_scope_is_mutated() {
    let app = App::in_memory().unwrap();
    let client = app.query_client(memory_cache());
    let (options, runs) = counting("horses");

    assert_eq!(client.fetch_query(&options).await.unwrap(), 1);
    assert_eq!(client.fetch_query(&options).await.unwrap(), 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // A mutation elsewhere leaves the horses scope cached
    client
        .mutate(
            "stalls",
            "stalls.create",
            json!({ "name": "A1", "barn": "North", "monthlyRateCents": 1 }),
        )
        .await
        .unwrap();
    assert_eq!(client.fetch_query(&options).await.unwrap(), 1);

    client.mutate("horses", "horses.create", star()).await.unwrap();
    assert_eq!(client.fetch_query(&options).await.unwrap(), 2);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let app = App::in_memory().unwrap();
    let client = app.query_client(memory_cache());
    let (options, runs) = counting("horses");

    client.fetch_query(&options).await.unwrap();
    let err = client
        .mutate("horses", "horses.create", json!({ "breed": "Arabian" }))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Validation(_)));

    client.fetch_query(&options).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let err = client
        .mutate("horses", "horses.teleport", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownFunction(_)));
}

#[tokio::test]
async fn test_list_query_sees_store_writes_through_signals() {
    let app = App::in_memory().unwrap();
    let client = app.query_client(memory_cache());
    let horses = list_query::<Horse>(client.functions(), &ListParams::default());

    assert_eq!(client.fetch_query(&horses).await.unwrap().total, 0);

    // Written behind the client's back; the store signal invalidates the scope
    app.functions.call("horses.create", star()).await.unwrap();

    let page = client.fetch_query(&horses).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Star");
}

#[tokio::test]
async fn test_detail_query_of_missing_record_is_none() {
    let app = App::in_memory().unwrap();
    let client = app.query_client(memory_cache());

    let missing = detail_query::<Stall>(client.functions(), Uuid::new_v4());
    assert_eq!(client.fetch_query(&missing).await.unwrap(), None);

    let created = client
        .mutate(
            "stalls",
            "stalls.create",
            json!({ "name": "B2", "barn": "South", "monthlyRateCents": 42_000 }),
        )
        .await
        .unwrap();
    let id: Uuid = serde_json::from_value(created["id"].clone()).unwrap();

    let stall = client
        .fetch_query(&detail_query::<Stall>(client.functions(), id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stall.monthly_rate_cents, 42_000);
    assert_eq!(stall.status, StallStatus::Available);
}

#[tokio::test]
async fn test_dashboard_refreshes_after_any_table_changes() {
    let app = App::in_memory().unwrap();
    let client = app.query_client(memory_cache());
    let overview = dashboard_query(client.functions());

    assert_eq!(client.fetch_query(&overview).await.unwrap(), DashboardOverview::default());

    client.mutate("horses", "horses.create", star()).await.unwrap();
    assert_eq!(client.fetch_query(&overview).await.unwrap().horses, 1);
}

#[tokio::test]
async fn test_fetch_all_keeps_results_independent() {
    let app = App::in_memory().unwrap();
    let client = QueryClient::with_memory_cache(Arc::clone(&app.functions));

    let good = list_query::<Stall>(client.functions(), &ListParams::default());
    let broken = QueryOptions::new(QueryKey::new("stalls", &json!({ "broken": true })), || async {
        Err::<Page<Stall>, _>(QueryError::Server("boom".to_string()))
    });

    let results = client.fetch_all(&[good, broken]).await;
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(QueryError::Server(_))));
}

#[tokio::test]
async fn test_zero_ttl_disables_caching() {
    let app = App::in_memory().unwrap();
    let manager = Arc::new(CacheManager::memory(CacheConfig::default()));
    let client = app.query_client(CacheParams::new(manager, 0, "stablehaus"));
    let (options, runs) = counting("horses");

    client.fetch_query(&options).await.unwrap();
    client.fetch_query(&options).await.unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_clients_stop_following_signals() {
    let app = App::in_memory().unwrap();
    let signals = app.haus.signals();
    let baseline = signals.callback_count();

    let first = app.query_client(memory_cache());
    let shared = first.clone();
    let mut second = app.query_client(memory_cache());
    assert_eq!(signals.callback_count(), baseline + 2);

    // Clones share the subscription until the last one is dropped
    drop(first);
    assert_eq!(signals.callback_count(), baseline + 2);
    drop(shared);
    assert_eq!(signals.callback_count(), baseline + 1);

    assert!(second.unsubscribe());
    assert!(!second.unsubscribe());
    assert_eq!(signals.callback_count(), baseline);
}
