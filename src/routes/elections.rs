//! Election status routes.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::Value;

use super::auth::BearerToken;
use super::path_segment;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{StatutUpdate, parse_body};

/// `GET /api/elections/{id}/statut`
pub async fn get_statut(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = path_segment("id", &id)?;
    let statut = state.backend.get(&format!("elections/{id}/statut"), &token).await?;
    Ok(Json(statut))
}

/// `PATCH /api/elections/{id}/statut`: body `{"statut": PREPARATION|EN_COURS|CLOTUREE|PUBLIEE}`.
pub async fn update_statut(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = path_segment("id", &id)?;
    let update: StatutUpdate = parse_body(&body)?;
    let payload = serde_json::to_value(&update).map_err(|e| ApiError::Internal(e.to_string()))?;

    let updated = state
        .backend
        .patch(&format!("elections/{id}/statut"), &token, &payload)
        .await?;
    tracing::info!(election = %id, statut = %update.statut, "election status updated");
    Ok(Json(updated))
}
