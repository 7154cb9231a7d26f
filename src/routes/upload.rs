//! Excel upload route.
//!
//! The browser posts a multipart form with a `file` part and the `code_cel`
//! / `nom_fichier` text fields. The file is checked (extension and size)
//! before it is re-streamed to the results API as a fresh multipart form.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::Json;
use serde_json::{Map, Value};

use super::auth::BearerToken;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{Issue, Schema, UploadMeta, check_upload_file};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

fn multipart_issue(message: impl Into<String>) -> ApiError {
    ApiError::Validation(vec![Issue::new("", "invalid_multipart", message)])
}

/// `POST /api/upload`: forward an Excel results file.
pub async fn upload_excel(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, ApiError> {
    let mut multipart = multipart.map_err(|e| multipart_issue(e.body_text()))?;

    let mut file: Option<UploadedFile> = None;
    let mut fields = Map::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_issue(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await.map_err(|e| multipart_issue(e.body_text()))?;
            file = Some(UploadedFile { name: file_name, content_type, bytes: bytes.to_vec() });
        } else {
            let text = field.text().await.map_err(|e| multipart_issue(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }
    }

    let Some(file) = file else {
        return Err(ApiError::Validation(vec![Issue::new("file", "required", "fichier requis")]));
    };
    if !fields.contains_key("nom_fichier") && !file.name.is_empty() {
        fields.insert("nom_fichier".into(), Value::String(file.name.clone()));
    }

    let mut issues = Vec::new();
    let meta = match UploadMeta::parse(&Value::Object(fields)) {
        Ok(meta) => Some(meta),
        Err(found) => {
            issues.extend(found);
            None
        }
    };
    if let Err(found) = check_upload_file(&file.name, file.bytes.len(), state.config.upload_max_bytes) {
        issues.extend(found);
    }
    let meta = match meta {
        Some(meta) if issues.is_empty() => meta,
        _ => return Err(ApiError::Validation(issues)),
    };

    let size = file.bytes.len();
    let part = reqwest::multipart::Part::bytes(file.bytes)
        .file_name(file.name.clone())
        .mime_str(file.content_type.as_deref().unwrap_or(XLSX_MIME))
        .map_err(|e| ApiError::Internal(format!("invalid upload mime type: {e}")))?;
    let form = reqwest::multipart::Form::new()
        .text("code_cel", meta.code_cel.clone())
        .text("nom_fichier", meta.nom_fichier.clone())
        .part("file", part);

    let result = state.backend.post_multipart("upload/excel", &token, form).await?;
    tracing::info!(code_cel = %meta.code_cel, file = %file.name, size, "excel file forwarded");
    Ok(Json(result))
}
