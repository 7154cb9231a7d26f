//! Portal API client with a 401 interceptor.
//!
//! Native counterpart of the browser's fetch wrapper: it talks to the portal
//! server's `/api/**` routes, carries the `access_token` cookie it received
//! at login, and reports every 401 on the expiry channel so the session
//! monitor can react. The interceptor never touches the session store.
//!
//! ERROR HANDLING
//! ==============
//! Failures mirror the server's envelope: `{"error"}` plus `details` for
//! validation. Callers get `ClientError` values; nothing panics.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::routes::auth::ACCESS_TOKEN_COOKIE;
use crate::session::{ExpiryReason, ExpirySender, ProbeOutcome, SessionProbe, SessionStore, UserProfile};
use crate::validation::{ElectionStatut, Issue, PublishRequest, StatutUpdate};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("invalid request: {message}")]
    Validation { message: String, details: Vec<Issue> },
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Vec<Issue>,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    expiry: ExpirySender,
    token: Mutex<Option<String>>,
}

impl PortalClient {
    #[must_use]
    pub fn new(base_url: &str, expiry: ExpirySender) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            expiry,
            token: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.token.lock().unwrap_or_else(PoisonError::into_inner).as_deref() {
            request = request.header(reqwest::header::COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"));
        }
        request
    }

    /// Send `request`; on 401, report expiry when `intercept` is set.
    async fn execute(&self, request: RequestBuilder, intercept: bool) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        let message = envelope
            .as_ref()
            .and_then(|e| e.error.clone())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_owned());

        match status {
            StatusCode::UNAUTHORIZED => {
                if intercept {
                    tracing::debug!(%message, "401 from portal; signalling session expiry");
                    self.expiry.notify(ExpiryReason::Unauthorized);
                }
                Err(ClientError::Unauthorized(message))
            }
            StatusCode::BAD_REQUEST => Err(ClientError::Validation {
                message,
                details: envelope.map(|e| e.details).unwrap_or_default(),
            }),
            _ => Err(ClientError::Api { status: status.as_u16(), message }),
        }
    }

    async fn json(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.execute(request, true).await?;
        let text = response.text().await.map_err(|e| ClientError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// `POST /api/auth/login`. A 401 here means bad credentials, not expiry,
    /// so it is not reported on the expiry channel.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let request = self
            .request(Method::POST, "/api/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }));
        let response = self.execute(request, false).await?;

        let token = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(access_token_from_set_cookie)
            .ok_or_else(|| ClientError::Decode("login response set no access_token cookie".into()))?;
        self.set_token(Some(token));

        let envelope: UserEnvelope = response.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(envelope.user)
    }

    /// Log in and move `store` to the authenticated phase.
    pub async fn sign_in(&self, store: &SessionStore, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let user = self.login(email, password).await?;
        if !store.login(user.clone()) {
            tracing::warn!("login completed while a session expiry was still being handled");
        }
        Ok(user)
    }

    /// Best-effort server logout; local state is always cleared.
    pub async fn sign_out(&self, store: &SessionStore) {
        let request = self.request(Method::POST, "/api/auth/logout");
        if let Err(e) = self.execute(request, false).await {
            tracing::warn!(error = %e, "logout request failed");
        }
        self.set_token(None);
        store.logout();
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let value = self.json(Method::GET, "/api/auth/me", None).await?;
        let envelope: UserEnvelope = serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(envelope.user)
    }

    // =========================================================================
    // RESOURCES
    // =========================================================================

    pub async fn circonscription_stats(&self, id: &str) -> Result<Value, ClientError> {
        self.json(Method::GET, &format!("/api/circonscriptions/{id}/stats"), None).await
    }

    pub async fn election_statut(&self, id: &str) -> Result<Value, ClientError> {
        self.json(Method::GET, &format!("/api/elections/{id}/statut"), None).await
    }

    pub async fn update_election_statut(&self, id: &str, statut: ElectionStatut) -> Result<Value, ClientError> {
        let body = serde_json::to_value(StatutUpdate { statut }).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.json(Method::PATCH, &format!("/api/elections/{id}/statut"), Some(&body)).await
    }

    pub async fn calculate_results(&self, id: &str) -> Result<Value, ClientError> {
        self.json(Method::POST, &format!("/api/resultats/{id}/calculate"), None).await
    }

    pub async fn publish_results(&self, id: &str, request: &PublishRequest) -> Result<Value, ClientError> {
        let body = serde_json::to_value(request).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.json(Method::POST, &format!("/api/resultats/{id}/publish"), Some(&body)).await
    }
}

/// Session probe backed by `GET /api/auth/me`, without the interceptor so a
/// rejection is reported once, by the probe loop.
#[async_trait]
impl SessionProbe for PortalClient {
    async fn check(&self) -> ProbeOutcome {
        let request = self.request(Method::GET, "/api/auth/me");
        match self.execute(request, false).await {
            Ok(_) => ProbeOutcome::Valid,
            Err(ClientError::Unauthorized(_)) => ProbeOutcome::Unauthorized,
            Err(_) => ProbeOutcome::Unavailable,
        }
    }
}

/// Value of `access_token` from one `Set-Cookie` header, if non-empty.
fn access_token_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name == ACCESS_TOKEN_COOKIE && !value.is_empty()).then(|| value.to_owned())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
