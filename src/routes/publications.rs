//! Per-department publication workflow.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde_json::Value;

use super::auth::BearerToken;
use super::path_segment;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/publications/departements`: publication status per department.
/// Query parameters (`page`, `limit`, `search`, ...) are forwarded untouched.
pub async fn list_departements(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let list = state
        .backend
        .get_with_query("publications/departements", &token, &query)
        .await?;
    Ok(Json(list))
}

/// `POST /api/publications/departements/{code}/publish`
pub async fn publish_departement(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(code): Path<String>,
) -> Result<Json<Value>, ApiError> {
    transition(&state, &token, &code, "publish").await
}

/// `POST /api/publications/departements/{code}/cancel`
pub async fn cancel_departement(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(code): Path<String>,
) -> Result<Json<Value>, ApiError> {
    transition(&state, &token, &code, "cancel").await
}

async fn transition(state: &AppState, token: &str, code: &str, action: &str) -> Result<Json<Value>, ApiError> {
    let code = path_segment("code", code)?;
    let result = state
        .backend
        .post(&format!("publications/departements/{code}/{action}"), Some(token), None)
        .await?;
    tracing::info!(departement = %code, %action, "department publication updated");
    Ok(Json(result))
}
