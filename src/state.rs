//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the parsed configuration and a single pooled client for the results
//! API. The portal keeps no per-user state of its own: the session lives in
//! the browser's httpOnly cookies and in the backend.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::error::ApiError;
use crate::services::backend::BackendClient;

/// Clone is required by Axum; inner fields are Arc-wrapped or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub backend: BackendClient,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the results API client cannot be built.
    pub fn new(config: PortalConfig) -> Result<Self, ApiError> {
        let backend = BackendClient::new(&config)?;
        Ok(Self { config: Arc::new(config), backend })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
