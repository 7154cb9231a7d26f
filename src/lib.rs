//! CEI results portal: backend proxy server plus the client-side session
//! lifecycle, role dispatch and display helpers.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;
