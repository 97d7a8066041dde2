//! Development HTTP service
//!
//! Exposes every server function at `POST /api/functions/{name}` next to a
//! handful of development endpoints (greeting, registration, table viewer).

mod auth;
mod handlers;

pub use auth::{hash_password, verify_password};

use crate::app::App;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Build the router over a wired application
pub fn build_router(app: Arc<App>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/users/hello", get(handlers::hello))
        .route("/auth/register", post(auth::register))
        .route("/devtools/get-table-data", get(handlers::table_data))
        .route("/api/functions/{name}", post(handlers::call_function))
        .with_state(app)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let message: String = message.into();
    (status, Json(json!({ "error": message }))).into_response()
}

/// Request body as JSON; an empty body is an empty object
fn json_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body)
}
