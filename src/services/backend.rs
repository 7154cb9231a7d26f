//! Results API client.
//!
//! Thin HTTP wrapper around the remote election-results backend. Every call
//! carries the caller's bearer token. Non-2xx answers are turned into
//! `ApiError::Upstream` with the best message that can be extracted from the
//! body. Response parsing is kept pure in `extract_error_message` and
//! `parse_success_body` for testability.

use axum::http::StatusCode;
use reqwest::Method;
use serde_json::Value;

use crate::config::PortalConfig;
use crate::error::ApiError;

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &PortalConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| ApiError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { http, base_url: config.api_base_url.clone() })
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, path, Some(token), None, &[]).await
    }

    pub async fn get_with_query(&self, path: &str, token: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        self.send(Method::GET, path, Some(token), None, query).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Option<&Value>) -> Result<Value, ApiError> {
        self.send(Method::POST, path, token, body, &[]).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: &Value) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, Some(token), Some(body), &[]).await
    }

    /// Forward a multipart form (Excel upload).
    pub async fn post_multipart(
        &self,
        path: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "forwarding multipart upload");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_response(response).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "forwarding to results api");

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !(200..300).contains(&status) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
        return Err(ApiError::Upstream { status, message: extract_error_message(&text, status) });
    }

    parse_success_body(&text)
}

// =============================================================================
// PARSING
// =============================================================================

/// Best-effort message from an upstream error body.
///
/// Looks at `message` (string or array of strings), then `error`, then
/// falls back to the status reason phrase.
#[must_use]
pub fn extract_error_message(body: &str, status: StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .map_or_else(|| format!("Erreur {}", status.as_u16()), str::to_owned)
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    match value.get("message") {
        Some(Value::String(message)) if !message.trim().is_empty() => return message.clone(),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if !parts.is_empty() {
                return parts.join(", ");
            }
        }
        _ => {}
    }

    match value.get("error") {
        Some(Value::String(error)) if !error.trim().is_empty() => error.clone(),
        _ => fallback(),
    }
}

/// Decode a 2xx body. An empty body (e.g. `204 No Content`) becomes `null`.
///
/// # Errors
///
/// Returns `ApiError::Network` if the body is not valid JSON.
pub fn parse_success_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Network(format!("invalid json from results api: {e}")))
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
