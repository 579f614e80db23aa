//! services/clinic_api/src/config.rs
//!
//! Defines the service's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development. The remote API credential is
//! never hardcoded; a missing key leaves the service up but unable to reach
//! the remote API, which the health endpoint reports.

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
    pub cliniko_api_key: Option<String>,
    pub cliniko_base_url: String,
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
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
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

        let cliniko_api_key = std::env::var("CLINIKO_API_KEY").ok().filter(|k| !k.is_empty());

        let cliniko_base_url = std::env::var("CLINIKO_BASE_URL")
            .unwrap_or_else(|_| "https://api.uk2.cliniko.com/v1".to_string());

        Ok(Self {
            bind_address,
            log_level,
            cliniko_api_key,
            cliniko_base_url,
        })
    }

    /// Whether the remote API credential is present, surfaced by `/health`.
    pub fn api_key_configured(&self) -> bool {
        self.cliniko_api_key.is_some()
    }
}
