use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::env;

use crate::auth::AuthConfig;
use crate::directory::DirectoryConfig;

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub auth: AuthConfig,
    pub directory: DirectoryConfig,
    /// Browser origins allowed to call the API with credentials. Empty means
    /// the server falls back to permissive CORS.
    pub cors_origins: Vec<HeaderValue>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            auth: AuthConfig::from_env().context("Failed to load auth configuration")?,
            directory: DirectoryConfig::from_env(),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }
}

/// Parse a comma-separated origin list, skipping blank and malformed entries.
pub fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {:?}", origin);
                None
            }
        })
        .collect()
}
