use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// The two API keys are intentionally optional here: per the run contract,
/// the language model client and the search tool fail with
/// `CredentialMissing` on first use rather than at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub output_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            serper_api_key: optional_env("SERPER_API_KEY"),
            output_dir: PathBuf::from(
                std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns `Some(value)` only if the variable is set and non-empty after
/// trimming. Empty values would otherwise produce confusing auth failures.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
