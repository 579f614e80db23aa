//! services/content_qa/src/error.rs
//!
//! Defines the primary error type for the service binary. Extraction and
//! answering never raise past their boundaries (failures degrade to
//! displayable text), so this type only covers startup plumbing.

use crate::config::ConfigError;

/// The primary error type for the `content_qa` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
