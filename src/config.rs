//! Environment-driven configuration.
//!
//! Values are read once at startup; `.env` loading happens in `main` via
//! dotenvy before this is consulted.

use anyhow::{Context, Result};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub oracle_api_key: String,
    pub oracle_base_url: String,
    pub oracle_model: String,
    pub batch_size: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Config {
    /// Reads configuration from the environment. Only the API key is
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let oracle_api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

        Ok(Self {
            oracle_api_key,
            oracle_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            oracle_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            batch_size: env_parse("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            max_retries: env_parse("MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            timeout_secs: env_parse("ORACLE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid value: {raw}")),
        Err(_) => Ok(default),
    }
}
