use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables. Both API
/// keys are optional: without `ANTHROPIC_API_KEY` the service runs rule-based
/// only, without `WORKNET_API_KEY` the public-institution source is skipped.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub anthropic_api_key: Option<String>,
    pub worknet_api_key: Option<String>,
    /// Directory for the seen-jobs registry and crawl snapshots.
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            worknet_api_key: optional_env("WORKNET_API_KEY"),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
        })
    }
}

/// Treats unset and empty the same way; an empty key is as useless as none.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
