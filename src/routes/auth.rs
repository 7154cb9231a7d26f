//! Auth routes: login, profile, token handoff and logout.

use axum::body::Bytes;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{Value, json};
use time::Duration;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{LoginRequest, parse_body};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
const SESSION_COOKIE_MAX_AGE_HOURS: i64 = 24;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Bearer token pulled from the httpOnly `access_token` cookie.
/// Use as a handler parameter to require authentication; a missing or empty
/// cookie rejects with 401 before the handler (and the backend) is reached.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        token_from_jar(&jar).map(Self).ok_or(ApiError::Unauthenticated)
    }
}

fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_TOKEN_COOKIE)
        .map(Cookie::value)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::hours(SESSION_COOKIE_MAX_AGE_HOURS))
        .build()
}

fn cleared_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Unwrap a `{"data": ...}` envelope if the results API used one.
pub(crate) fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") => obj.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// Pull the tokens out of a login response, accepting camelCase or snake_case keys.
pub(crate) fn login_tokens(body: &Value) -> Option<(String, Option<String>)> {
    let pick = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    let access = pick(&["accessToken", "access_token", "token"])?;
    Some((access, pick(&["refreshToken", "refresh_token"])))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login`: exchange credentials, set httpOnly cookies, return the user.
pub async fn login(State(state): State<AppState>, jar: CookieJar, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let credentials: LoginRequest = parse_body(&body)?;
    let payload = json!({ "email": credentials.email, "password": credentials.password });

    let upstream = unwrap_data(state.backend.post("auth/login", None, Some(&payload)).await?);
    let Some((access, refresh)) = login_tokens(&upstream) else {
        return Err(ApiError::Internal("login response carried no access token".into()));
    };

    tracing::info!(email = %credentials.email, "user logged in");

    let secure = state.config.cookie_secure;
    let mut jar = jar.add(session_cookie(ACCESS_TOKEN_COOKIE, access, secure));
    if let Some(refresh) = refresh {
        jar = jar.add(session_cookie(REFRESH_TOKEN_COOKIE, refresh, secure));
    }
    let user = upstream.get("user").cloned().unwrap_or(Value::Null);
    Ok((jar, Json(json!({ "user": user }))))
}

/// `GET /api/auth/me`: current user's profile from the results API.
pub async fn me(State(state): State<AppState>, BearerToken(token): BearerToken) -> Result<Json<Value>, ApiError> {
    let profile = unwrap_data(state.backend.get("auth/profile", &token).await?);
    Ok(Json(json!({ "user": profile })))
}

/// `GET /api/auth/token`: hand the cookie token to client code that must
/// call the results API directly.
pub async fn token(BearerToken(token): BearerToken) -> Json<Value> {
    Json(json!({ "token": token }))
}

/// `POST /api/auth/logout`: invalidate upstream (best effort), always clear cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = token_from_jar(&jar) {
        if let Err(e) = state.backend.post("auth/logout", Some(&token), None).await {
            tracing::warn!(error = %e, "upstream logout failed; clearing cookies anyway");
        }
    }

    let secure = state.config.cookie_secure;
    let jar = jar
        .add(cleared_cookie(ACCESS_TOKEN_COOKIE, secure))
        .add(cleared_cookie(REFRESH_TOKEN_COOKIE, secure));
    (jar, Json(json!({ "success": true, "message": "Déconnexion réussie" })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
