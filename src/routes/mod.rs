//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every `/api/**` route is a thin proxy: it pulls the bearer token from the
//! httpOnly cookie, validates mutating payloads, forwards to the results API
//! and reshapes failures into the `{"error": ...}` envelope.

pub mod auth;
pub mod circonscriptions;
pub mod elections;
pub mod publications;
pub mod resultats;
pub mod upload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::PortalConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::Issue;

/// Multipart framing on top of the file itself.
const UPLOAD_BODY_OVERHEAD: usize = 64 * 1024;

/// Full portal router: API proxy routes, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let upload_limit = DefaultBodyLimit::max(state.config.upload_max_bytes + UPLOAD_BODY_OVERHEAD);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/token", get(auth::token))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/circonscriptions/{id}/stats", get(circonscriptions::stats))
        .route(
            "/api/elections/{id}/statut",
            get(elections::get_statut).patch(elections::update_statut),
        )
        .route("/api/resultats/{id}/calculate", post(resultats::calculate))
        .route("/api/resultats/{id}/publish", post(resultats::publish))
        .route("/api/publications/departements", get(publications::list_departements))
        .route(
            "/api/publications/departements/{code}/publish",
            post(publications::publish_departement),
        )
        .route(
            "/api/publications/departements/{code}/cancel",
            post(publications::cancel_departement),
        )
        .route("/api/upload", post(upload::upload_excel).layer(upload_limit))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &PortalConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Accept a path parameter only if it is safe to splice into an upstream URL.
pub(crate) fn path_segment<'a>(name: &str, raw: &'a str) -> Result<&'a str, ApiError> {
    let valid = !raw.is_empty()
        && raw.len() <= 64
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(raw)
    } else {
        Err(ApiError::Validation(vec![Issue::new(name, "invalid_string", "identifiant invalide")]))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
