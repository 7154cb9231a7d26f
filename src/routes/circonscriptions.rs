//! Circonscription routes.

use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::Value;

use super::auth::BearerToken;
use super::path_segment;
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/circonscriptions/{id}/stats`: participation and transmission stats.
pub async fn stats(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = path_segment("id", &id)?;
    let stats = state
        .backend
        .get(&format!("circonscriptions/{id}/stats"), &token)
        .await?;
    Ok(Json(stats))
}
