//! Integration tests for the PostgreSQL store
//!
//! Run against the database named by `DATABASE_URL`; skipped when it is unset.

use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgPool;
use stablehaus::prelude::*;

async fn setup_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL tests");
        return None;
    };

    Some(
        PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database"),
    )
}

async fn recreate_table<T: TableMetadata>(pool: &PgPool) {
    sqlx::query(&T::drop_table_sql())
        .execute(pool)
        .await
        .expect("Failed to drop table");
    sqlx::query(&T::create_table_sql())
        .execute(pool)
        .await
        .expect("Failed to create table");
    for sql in T::create_indexes_sql() {
        sqlx::query(&sql)
            .execute(pool)
            .await
            .expect("Failed to create index");
    }
}

fn stall(name: &str, barn: &str, status: StallStatus, cents: i64) -> Stall {
    let meta = RecordMeta::fresh();
    Stall {
        id: meta.id,
        name: name.to_string(),
        barn: barn.to_string(),
        size: Some("12x12".to_string()),
        monthly_rate_cents: cents,
        status,
        horse_id: None,
        notes: None,
        created_at: meta.created_at,
        updated_at: meta.updated_at,
    }
}

// One test body keeps the shared tables free of parallel interference
#[tokio::test]
async fn test_postgres_store() {
    let Some(pool) = setup_pool().await else {
        return;
    };

    stall_crud_and_queries(&pool).await;
    report_json_round_trip(&pool).await;
}

async fn stall_crud_and_queries(pool: &PgPool) {
    recreate_table::<Stall>(pool).await;
    let store = GenericStore::<Stall>::new(pool.clone(), None);

    let north = store
        .create(stall("North 1", "North Barn", StallStatus::Available, 40_000))
        .await
        .unwrap();
    store
        .create(stall("North 2", "North Barn", StallStatus::Occupied, 45_000))
        .await
        .unwrap();
    store
        .create(stall("South_1", "South Barn", StallStatus::Occupied, 50_000))
        .await
        .unwrap();

    let fetched = store.get_by_id(&north.id).await.unwrap().unwrap();
    assert_eq!(fetched, north);

    let params = ListParams::from_value(&json!({
        "search": "north",
        "status": "occupied",
        "pageSize": 5
    }));
    let query = params.to_query::<Stall>();
    assert_eq!(store.count_where(query.clone()).await.unwrap(), 1);
    let found = store.find(query.paginate(&params.pagination())).await.unwrap();
    assert_eq!(found[0].name, "North 2");

    // LIKE wildcards in search text match literally
    let underscore = ListParams::from_value(&json!({ "search": "h_1" }));
    let found = store.find(underscore.to_query::<Stall>()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "South_1");

    let mut changed = north.clone();
    changed.status = StallStatus::Maintenance;
    let updated = store.update(&north.id, changed).await.unwrap();
    assert_eq!(updated.status, StallStatus::Maintenance);
    assert_eq!(updated.created_at, north.created_at);

    let missing = store
        .update(&Uuid::new_v4(), stall("Ghost", "None", StallStatus::Available, 0))
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));

    assert!(store.delete(&north.id).await.unwrap());
    assert!(!store.delete(&north.id).await.unwrap());
    assert_eq!(store.get_by_id(&north.id).await.unwrap(), None);
    assert_eq!(store.count().await.unwrap(), 2);

    sqlx::query(&Stall::drop_table_sql()).execute(pool).await.unwrap();
}

async fn report_json_round_trip(pool: &PgPool) {
    recreate_table::<Report>(pool).await;
    let store = GenericStore::<Report>::new(pool.clone(), None);

    let meta = RecordMeta::fresh();
    let report = Report {
        id: meta.id,
        title: "Occupancy".to_string(),
        kind: ReportKind::Occupancy,
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
        date_to: None,
        generated_at: meta.created_at,
        summary: json!({ "totalStalls": 4, "byStatus": { "occupied": 3 } }),
        created_at: meta.created_at,
        updated_at: meta.updated_at,
    };

    let created = store.create(report.clone()).await.unwrap();
    assert_eq!(created, report);

    let fetched = store.get_by_id(&report.id).await.unwrap().unwrap();
    assert_eq!(fetched.summary["byStatus"]["occupied"], 3);
    assert_eq!(fetched.date_from, report.date_from);

    sqlx::query(&Report::drop_table_sql()).execute(pool).await.unwrap();
}
