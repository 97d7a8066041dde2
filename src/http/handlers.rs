use super::{error_response, json_body};
use crate::app::App;
use crate::server_fn::{InputValidationError, ServerResponse};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn health(State(app): State<Arc<App>>) -> Response {
    let backend = app.haus.backend();
    match app.haus.health_check().await {
        Ok(()) => Json(json!({ "status": "ok", "backend": backend })).into_response(),
        Err(error) => {
            tracing::error!(%error, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "backend": backend, "error": error.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello from StableHaus" }))
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    table: Option<String>,
}

/// Every row of one dashboard table
pub async fn table_data(State(app): State<Arc<App>>, Query(query): Query<TableQuery>) -> Response {
    let Some(table) = query.table.filter(|t| !t.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing table parameter");
    };

    match app.functions.table_rows(&table).await {
        None => error_response(StatusCode::NOT_FOUND, format!("Unknown table: {}", table)),
        Some(Ok(rows)) => Json(json!({ "table": table, "rows": rows })).into_response(),
        Some(Err(error)) => {
            tracing::error!(%table, %error, "failed to read table");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}

/// Server function call; the body is the function's input
pub async fn call_function(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let input = match json_body(&body) {
        Ok(input) => input,
        Err(error) => {
            let response: ServerResponse<Value> =
                InputValidationError::form(format!("Invalid JSON body: {}", error)).into();
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    match app.functions.call(&name, input).await {
        Some(response) => Json(response).into_response(),
        None => {
            tracing::debug!(%name, "unknown server function");
            error_response(StatusCode::NOT_FOUND, format!("Unknown server function: {}", name))
        }
    }
}
