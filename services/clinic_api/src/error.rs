//! services/clinic_api/src/error.rs
//!
//! Defines the primary error type for the service binary. Tool handlers
//! never raise: validation and remote failures are returned as structured
//! payloads, so this type only covers startup plumbing.

use crate::config::ConfigError;

/// The primary error type for the `clinic_api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
