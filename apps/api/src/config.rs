use anyhow::{Context, Result};

use crate::dialogue::sessions;
use crate::job_search;
use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub rapidapi_key: String,
    pub jsearch_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Sessions idle this long are dropped.
    pub session_idle_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| llm_client::DEFAULT_API_URL.to_string()),
            rapidapi_key: require_env("RAPIDAPI_KEY")?,
            jsearch_api_url: std::env::var("JSEARCH_API_URL")
                .unwrap_or_else(|_| job_search::DEFAULT_API_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_idle_ttl_secs: std::env::var("SESSION_IDLE_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .unwrap_or(Ok(sessions::DEFAULT_IDLE_TTL.as_secs()))
                .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
            max_sessions: std::env::var("MAX_SESSIONS")
                .map(|v| v.parse::<usize>())
                .unwrap_or(Ok(sessions::DEFAULT_MAX_SESSIONS))
                .context("MAX_SESSIONS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
