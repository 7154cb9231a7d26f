//! Results consolidation and publication routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::Value;

use super::auth::BearerToken;
use super::path_segment;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{PublishRequest, parse_body};

/// `POST /api/resultats/{id}/calculate`: trigger consolidation of the election's results.
pub async fn calculate(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = path_segment("id", &id)?;
    let result = state
        .backend
        .post(&format!("resultats/{id}/calculate"), Some(&token), None)
        .await?;
    tracing::info!(election = %id, "results calculation requested");
    Ok(Json(result))
}

/// `POST /api/resultats/{id}/publish`: publish consolidated results, optionally
/// restricted to a list of departments.
pub async fn publish(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = path_segment("id", &id)?;
    let request: PublishRequest = parse_body(&body)?;
    let payload = serde_json::to_value(&request).map_err(|e| ApiError::Internal(e.to_string()))?;

    let result = state
        .backend
        .post(&format!("resultats/{id}/publish"), Some(&token), Some(&payload))
        .await?;
    tracing::info!(
        election = %id,
        departements = request.departements.as_ref().map_or(0, Vec::len),
        "results published"
    );
    Ok(Json(result))
}
