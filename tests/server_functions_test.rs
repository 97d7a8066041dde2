//! Integration tests for the entity server functions over in-memory stores
//!
//! Exercises the public call surface the dashboard uses: name-addressed
//! functions taking and returning JSON.

use serde_json::{Value, json};
use stablehaus::prelude::*;

fn app() -> App {
    App::in_memory().unwrap()
}

async fn call(app: &App, name: &str, input: Value) -> ServerResponse<Value> {
    app.functions.call(name, input).await.unwrap()
}

fn data(response: ServerResponse<Value>) -> Value {
    match response {
        ServerResponse::Data(data) => data,
        other => panic!("expected data, got {:?}", other),
    }
}

fn validation(response: ServerResponse<Value>) -> InputValidationError {
    match response {
        ServerResponse::InputValidationError(errors) => errors,
        other => panic!("expected validation error, got {:?}", other),
    }
}

fn star() -> Value {
    json!({
        "name": "Star",
        "breed": "Arabian",
        "dateOfBirth": "2020-01-01",
        "gender": "mare",
        "color": "bay"
    })
}

#[tokio::test]
async fn test_create_horse_then_list_includes_it() {
    let app = app();

    let created = data(call(&app, "horses.create", star()).await);
    assert_eq!(created["name"], "Star");
    assert!(created["id"].is_string());
    assert!(created["createdAt"].is_string());

    let page = data(call(&app, "horses.list", json!({})).await);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], created["id"]);
    assert_eq!(page["items"][0]["breed"], "Arabian");
}

#[tokio::test]
async fn test_create_then_get_round_trips_submitted_fields() {
    let app = app();
    let input = star();

    let created = data(call(&app, "horses.create", input.clone()).await);
    let fetched = data(call(&app, "horses.get", json!({ "id": created["id"] })).await);

    for (key, value) in input.as_object().unwrap() {
        assert_eq!(&fetched[key], value, "field {}", key);
    }
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_missing_name_is_a_validation_error_and_writes_nothing() {
    let app = app();
    let mut input = star();
    input.as_object_mut().unwrap().remove("name");

    let errors = validation(call(&app, "horses.create", input).await);
    assert!(errors.field_errors.contains_key("name"));

    assert_eq!(app.stores.horses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_whitespace_only_text_is_not_a_value() {
    let app = app();
    let mut input = star();
    input["name"] = json!("   ");
    input["breed"] = json!("\t\n");

    let errors = validation(call(&app, "horses.create", input).await);
    assert_eq!(errors.field_errors["name"], vec!["Name is required".to_string()]);
    assert_eq!(errors.field_errors["breed"], vec!["Breed is required".to_string()]);
    assert_eq!(app.stores.horses.count().await.unwrap(), 0);

    let errors = validation(
        call(
            &app,
            "stalls.create",
            json!({ "name": " ", "barn": "North", "monthlyRateCents": 1 }),
        )
        .await,
    );
    assert!(errors.field_errors.contains_key("name"));
    assert!(!errors.field_errors.contains_key("barn"));
}

#[tokio::test]
async fn test_missing_non_text_field_is_required() {
    let app = app();
    let mut input = star();
    input.as_object_mut().unwrap().remove("dateOfBirth");

    let errors = validation(call(&app, "horses.create", input).await);
    assert_eq!(errors.field_errors["dateOfBirth"], vec!["Required".to_string()]);
    assert_eq!(app.stores.horses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cross_field_rule_is_a_form_error() {
    let app = app();
    let invoice = json!({
        "boarderId": Uuid::new_v4(),
        "invoiceNumber": "INV-1",
        "issueDate": "2024-03-10",
        "dueDate": "2024-03-01",
        "amountCents": 50_000
    });

    let errors = validation(call(&app, "invoices.create", invoice).await);
    assert_eq!(errors.form_errors.len(), 1);
    assert_eq!(app.stores.invoices.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_then_get_is_null() {
    let app = app();
    let created = data(call(&app, "horses.create", star()).await);
    let id = json!({ "id": created["id"] });

    let deleted = data(call(&app, "horses.delete", id.clone()).await);
    assert_eq!(deleted, json!({ "deleted": true }));
    assert_eq!(data(call(&app, "horses.get", id.clone()).await), Value::Null);

    let again = data(call(&app, "horses.delete", id).await);
    assert_eq!(again, json!({ "deleted": false }));
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_identity() {
    let app = app();
    let created = data(call(&app, "horses.create", star()).await);

    let mut changed = star();
    changed["name"] = json!("Morning Star");
    changed["medicalNotes"] = json!("Shod on 2024-05-01");
    let updated = data(
        call(
            &app,
            "horses.update",
            json!({ "id": created["id"], "data": changed }),
        )
        .await,
    );

    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_eq!(updated["name"], "Morning Star");
    assert_eq!(updated["medicalNotes"], "Shod on 2024-05-01");
    assert_eq!(app.stores.horses.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_of_missing_record_is_an_error() {
    let app = app();
    let response = call(
        &app,
        "horses.update",
        json!({ "id": Uuid::new_v4(), "data": star() }),
    )
    .await;
    assert!(matches!(response, ServerResponse::Error(_)));
    assert_eq!(app.stores.horses.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_bad_ids_are_field_errors() {
    let app = app();

    let errors = validation(call(&app, "stalls.get", json!({})).await);
    assert_eq!(errors.field_errors["id"], vec!["Required".to_string()]);

    let errors = validation(call(&app, "stalls.delete", json!({ "id": "stall-7" })).await);
    assert_eq!(errors.field_errors["id"], vec!["Invalid id".to_string()]);
}

#[tokio::test]
async fn test_page_parameters_are_clamped() {
    let app = app();
    for n in 0..3 {
        let mut horse = star();
        horse["name"] = json!(format!("Horse {}", n));
        data(call(&app, "horses.create", horse).await);
    }

    let page = data(call(&app, "horses.list", json!({ "page": 0, "pageSize": 0 })).await);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 1);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 3);

    let page = data(call(&app, "horses.list", json!({ "page": -5, "pageSize": 1000 })).await);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 100);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_search_status_sort_and_dates() {
    let app = app();
    for (name, barn, rate, status) in [
        ("North 1", "North Barn", 40_000, "available"),
        ("North 2", "North Barn", 45_000, "occupied"),
        ("South 1", "South Barn", 50_000, "occupied"),
        ("Paddock", "South Barn", 30_000, "maintenance"),
    ] {
        data(
            call(
                &app,
                "stalls.create",
                json!({ "name": name, "barn": barn, "monthlyRateCents": rate, "status": status }),
            )
            .await,
        );
    }

    // Search matches any searchable column, case-insensitively
    let page = data(call(&app, "stalls.list", json!({ "search": "south" })).await);
    assert_eq!(page["total"], 2);

    let page = data(
        call(
            &app,
            "stalls.list",
            json!({ "status": "occupied", "sort": "monthlyRateCents", "order": "desc" }),
        )
        .await,
    );
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["South 1", "North 2"]);

    let page = data(call(&app, "stalls.list", json!({ "status": "demolished" })).await);
    assert_eq!(page["total"], 0);

    for (name, dob) in [("Old", "2010-06-01"), ("Young", "2022-02-28")] {
        let mut horse = star();
        horse["name"] = json!(name);
        horse["dateOfBirth"] = json!(dob);
        data(call(&app, "horses.create", horse).await);
    }
    let page = data(
        call(
            &app,
            "horses.list",
            json!({ "from": "2022-01-01", "to": "2022-02-28" }),
        )
        .await,
    );
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "Young");
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let app = app();
    for name in ["100% Barn", "1000 Acres"] {
        data(
            call(
                &app,
                "facilities.create",
                json!({ "name": name, "facilityType": "barn" }),
            )
            .await,
        );
    }

    let page = data(call(&app, "facilities.list", json!({ "search": "100%" })).await);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "100% Barn");
}

#[tokio::test]
async fn test_unknown_function_is_none() {
    let app = app();
    assert!(app.functions.call("horses.gallop", json!({})).await.is_none());
    assert!(app.functions.call("users.create", json!({})).await.is_none());
}

#[tokio::test]
async fn test_user_rows_hide_password_hashes() {
    let app = app();
    let user = User {
        id: Uuid::new_v4(),
        email: "ada@example.com".to_string(),
        name: "Ada".to_string(),
        password_hash: "$argon2id$secret".to_string(),
        created_at: now(),
        updated_at: now(),
    };
    app.stores.users.create(user).await.unwrap();

    let rows = app.functions.table_rows("users").await.unwrap().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "ada@example.com");
    assert!(rows[0].get("passwordHash").is_none());
}
