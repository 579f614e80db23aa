//! services/content_qa/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development. A missing completion-API key
//! leaves the service up: answers degrade to the offline fallback.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub qa_model: String,
    /// Gates the headless-browser extraction strategy; plain fetches still
    /// run when disabled.
    pub browser_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let openai_api_base = std::env::var("OPENAI_API_BASE").ok().filter(|b| !b.is_empty());

        let qa_model = std::env::var("QA_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let browser_enabled = match std::env::var("BROWSER_ENABLED") {
            Ok(value) => {
                let lowered = value.to_lowercase();
                !matches!(lowered.as_str(), "0" | "false" | "no" | "off")
            }
            Err(_) => true,
        };

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            openai_api_base,
            qa_model,
            browser_enabled,
        })
    }
}
