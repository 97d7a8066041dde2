//! Integration tests for the HTTP service on an ephemeral port

use serde_json::{Value, json};
use stablehaus::{App, http::build_router};
use std::sync::Arc;

/// Spin up the HTTP server on an OS-assigned port, returning the base URL
async fn spawn_test_server() -> String {
    let app = Arc::new(App::in_memory().unwrap());
    let router = build_router(app);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn post(base: &str, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn hello_endpoint_greets() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/users/hello", base)).await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Hello from StableHaus" }));
}

#[tokio::test]
async fn health_reports_backend() {
    let base = spawn_test_server().await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "backend": "memory" }));
}

#[tokio::test]
async fn register_creates_user_without_exposing_hash() {
    let base = spawn_test_server().await;
    let resp = post(
        &base,
        "/auth/register",
        json!({ "email": "Rider@Example.com", "password": "long enough", "name": "Rider" }),
    )
    .await;

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "rider@example.com");
    assert_eq!(body["name"], "Rider");
    assert!(body["id"].is_string());
    assert!(body["createdAt"].is_string());
    assert!(body.get("passwordHash").is_none());

    let resp = reqwest::get(format!("{}/devtools/get-table-data?table=users", base))
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert!(body["rows"][0].get("passwordHash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let base = spawn_test_server().await;
    let resp = post(
        &base,
        "/auth/register",
        json!({ "email": "not-an-email", "password": "short", "name": "" }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    let fields = &body["inputValidationError"]["fieldErrors"];
    assert!(fields["email"].is_array());
    assert!(fields["password"].is_array());
    assert!(fields["name"].is_array());
}

#[tokio::test]
async fn register_rejects_blank_name() {
    let base = spawn_test_server().await;
    let resp = post(
        &base,
        "/auth/register",
        json!({ "email": "blank@example.com", "password": "long enough", "name": "   " }),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["inputValidationError"]["fieldErrors"]["name"].is_array());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let base = spawn_test_server().await;
    let user = json!({ "email": "dup@example.com", "password": "long enough", "name": "Dup" });

    assert_eq!(post(&base, "/auth/register", user.clone()).await.status(), 201);

    let mut shouted = user;
    shouted["email"] = json!("DUP@example.com");
    let resp = post(&base, "/auth/register", shouted).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn concurrent_registrations_of_one_email_create_one_user() {
    let base = spawn_test_server().await;
    let attempts = (0..8).map(|i| {
        let base = base.clone();
        tokio::spawn(async move {
            let user = json!({
                "email": "race@example.com",
                "password": "long enough",
                "name": format!("Racer {}", i)
            });
            post(&base, "/auth/register", user).await.status().as_u16()
        })
    });

    let mut statuses = Vec::new();
    for attempt in attempts.collect::<Vec<_>>() {
        statuses.push(attempt.await.unwrap());
    }
    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 7);

    let resp = reqwest::get(format!("{}/devtools/get-table-data?table=users", base))
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn functions_are_callable_over_http() {
    let base = spawn_test_server().await;
    let resp = post(
        &base,
        "/api/functions/horses.create",
        json!({
            "name": "Star",
            "breed": "Arabian",
            "dateOfBirth": "2020-01-01",
            "gender": "mare",
            "color": "bay"
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["data"]["name"], "Star");

    let resp = post(&base, "/api/functions/horses.list", json!({ "search": "star" })).await;
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["data"]["total"], 1);

    let resp = post(&base, "/api/functions/horses.create", json!({ "breed": "Arabian" })).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["inputValidationError"]["fieldErrors"]["name"].is_array());

    let resp = reqwest::get(format!("{}/devtools/get-table-data?table=horses", base))
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["table"], "horses");
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_body_is_an_empty_input() {
    let base = spawn_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/functions/stalls.list", base))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["pageSize"], 10);
}

#[tokio::test]
async fn malformed_body_is_a_form_error() {
    let base = spawn_test_server().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/api/functions/stalls.create", base))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["inputValidationError"]["formErrors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_names_are_not_found() {
    let base = spawn_test_server().await;

    let resp = post(&base, "/api/functions/horses.gallop", json!({})).await;
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{}/devtools/get-table-data?table=secrets", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::get(format!("{}/devtools/get-table-data", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
