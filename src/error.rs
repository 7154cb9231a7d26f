//! Error taxonomy for the proxy routes.
//!
//! Every failure leaves the server as a JSON envelope `{"error": ...}`. The
//! status code tells the browser which kind it is; validation failures add a
//! `details` array of issues.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::validation::Issue;

pub const MSG_UNAUTHENTICATED: &str = "Non authentifié";
pub const MSG_INVALID_DATA: &str = "Données invalides";
pub const MSG_INTERNAL: &str = "Erreur interne du serveur";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No bearer token in the cookie store.
    #[error("unauthenticated")]
    Unauthenticated,
    /// Payload rejected by its schema.
    #[error("validation failed ({} issues)", .0.len())]
    Validation(Vec<Issue>),
    /// Non-2xx response from the results API.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },
    /// The results API could not be reached or answered garbage.
    #[error("upstream request failed: {0}")]
    Network(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Network(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Vec<Issue>> for ApiError {
    fn from(issues: Vec<Issue>) -> Self {
        Self::Validation(issues)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }

        let body = match self {
            Self::Unauthenticated => json!({ "error": MSG_UNAUTHENTICATED }),
            Self::Validation(issues) => json!({ "error": MSG_INVALID_DATA, "details": issues }),
            Self::Upstream { message, .. } => json!({ "error": message }),
            Self::Network(_) | Self::Internal(_) => json!({ "error": MSG_INTERNAL }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
