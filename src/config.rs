//! Portal configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Everything the server needs is read once at startup into a typed
//! `PortalConfig`. Missing values fall back to development defaults so a
//! local `cargo run` works against a backend on `localhost:8080`.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_DEV_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production" | "prod") => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub port: u16,
    /// Base URL of the results API, without trailing slash.
    pub api_base_url: String,
    pub environment: Environment,
    pub dev_origins: Vec<String>,
    pub prod_origins: Vec<String>,
    pub cookie_secure: bool,
    pub timeouts: UpstreamTimeouts,
    pub upload_max_bytes: usize,
}

impl PortalConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `API_BASE_URL`: default `http://localhost:8080/api/v1`
    /// - `APP_ENV`: `development` (default) or `production`
    /// - `CORS_ORIGINS_DEV` / `CORS_ORIGINS_PROD`: comma-separated origins
    /// - `COOKIE_SECURE`: defaults to true in production
    /// - `UPSTREAM_TIMEOUT_SECS`: default 30
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `UPLOAD_MAX_BYTES`: default 10 MiB
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw.clone() })?,
            Err(_) => DEFAULT_PORT,
        };

        let environment = Environment::parse(std::env::var("APP_ENV").ok().as_deref());
        let api_base_url = normalize_base_url(
            &std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        );
        let dev_origins =
            parse_origins(&std::env::var("CORS_ORIGINS_DEV").unwrap_or_else(|_| DEFAULT_DEV_ORIGINS.to_owned()));
        let prod_origins = parse_origins(&std::env::var("CORS_ORIGINS_PROD").unwrap_or_default());
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or(environment == Environment::Production);

        let timeouts = UpstreamTimeouts {
            request: Duration::from_secs(env_parse("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)),
            connect: Duration::from_secs(env_parse(
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS,
            )),
        };

        Ok(Self {
            port,
            api_base_url,
            environment,
            dev_origins,
            prod_origins,
            cookie_secure,
            timeouts,
            upload_max_bytes: env_parse("UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
        })
    }

    /// Config pointing at `api_base_url` with development defaults everywhere else.
    #[must_use]
    pub fn for_base_url(api_base_url: &str) -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: normalize_base_url(api_base_url),
            environment: Environment::Development,
            dev_origins: parse_origins(DEFAULT_DEV_ORIGINS),
            prod_origins: Vec::new(),
            cookie_secure: false,
            timeouts: UpstreamTimeouts {
                request: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
                connect: Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS),
            },
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
        }
    }

    /// Origins allowed by CORS for the active environment.
    #[must_use]
    pub fn allowed_origins(&self) -> &[String] {
        match self.environment {
            Environment::Development => &self.dev_origins,
            Environment::Production => &self.prod_origins,
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
