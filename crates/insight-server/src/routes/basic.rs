use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/raise-error", get(raise_error))
}

async fn welcome(State(state): State<AppState>) -> Json<String> {
    Json(format!("welcome to {}", state.app_name))
}

async fn health(State(state): State<AppState>) -> Json<String> {
    Json(format!("App {} doing fine ...", state.app_name))
}

#[derive(Debug, Deserialize)]
pub struct RaiseErrorParams {
    should_fail: bool,
}

/// Exercises the error path: fails with 400 on request.
async fn raise_error(
    params: Result<Query<RaiseErrorParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    })?;

    if params.should_fail {
        return Err(ApiError::bad_request("This is a bad request"));
    }
    Ok(Json(json!({ "message": "Success" })))
}
