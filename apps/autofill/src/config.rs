use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the HTTP profile store. Takes precedence over `profile_path`.
    pub profile_store_url: Option<String>,
    /// JSON profile on disk, used when no store URL is set.
    pub profile_path: Option<PathBuf>,
    pub profile_store_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            profile_store_url: optional("PROFILE_STORE_URL"),
            profile_path: optional("PROFILE_PATH").map(PathBuf::from),
            profile_store_timeout_secs: var("PROFILE_STORE_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u64>()
                .context("PROFILE_STORE_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }
}
