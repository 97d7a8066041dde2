use super::{error_response, json_body};
use crate::app::App;
use crate::models::{RecordMeta, RegisterInput, User};
use crate::server_fn::{InputValidationError, ServerResponse, parse_input};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::Arc;
use store_object::{QueryBuilder, QueryFilter, StoreError};

/// Argon2id hash of `password` in PHC string format
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn validation_failed(errors: InputValidationError) -> Response {
    let response: ServerResponse<Value> = errors.into();
    (StatusCode::BAD_REQUEST, Json(response)).into_response()
}

fn email_taken() -> Response {
    error_response(StatusCode::CONFLICT, "User with this email already exists")
}

pub async fn register(State(app): State<Arc<App>>, body: Bytes) -> Response {
    let input = match json_body(&body)
        .map_err(|e| InputValidationError::form(format!("Invalid JSON body: {}", e)))
        .and_then(parse_input::<RegisterInput>)
    {
        Ok(input) => input,
        Err(errors) => return validation_failed(errors),
    };

    let email = input.email.trim().to_lowercase();

    let password = input.password;
    let password_hash = match tokio::task::spawn_blocking(move || hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(error)) => {
            tracing::error!(%error, "password hashing failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Password hashing failed");
        }
        Err(error) => {
            tracing::error!(%error, "password hashing task failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Password hashing failed");
        }
    };

    // Lookup and insert are one step per process; PostgreSQL's unique index covers the rest
    let _registering = app.registrations.lock().await;
    let existing = app
        .stores
        .users
        .find_one(QueryBuilder::new().filter(QueryFilter::eq("email", json!(email))))
        .await;
    match existing {
        Ok(Some(_)) => return email_taken(),
        Ok(None) => {}
        Err(error) => {
            tracing::error!(%error, "failed to look up user");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string());
        }
    }

    let meta = RecordMeta::fresh();
    let user = User {
        id: meta.id,
        email,
        name: input.name.trim().to_string(),
        password_hash,
        created_at: meta.created_at,
        updated_at: meta.updated_at,
    };

    match app.stores.users.create(user).await {
        Ok(user) => {
            tracing::info!(id = %user.id, "registered user");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": user.id,
                    "email": user.email,
                    "name": user.name,
                    "createdAt": user.created_at,
                })),
            )
                .into_response()
        }
        // Lost a race against a concurrent registration of the same email
        Err(StoreError::Conflict(_)) => email_taken(),
        Err(error) => {
            tracing::error!(%error, "failed to create user");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}
