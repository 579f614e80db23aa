//! crates/gateway_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the gateways' core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! services to be independent of specific external implementations like the
//! clinic API, the completion API, or a browser engine.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ExtractionResult, Resource};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A remote API answered with a non-2xx status. The upstream status and
    /// response body are preserved as text.
    #[error("Remote API error (status {status}): {body}")]
    Remote { status: u16, body: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// One authenticated call per operation against the remote clinic API.
///
/// The per-resource duplication of the remote surface (four resources times
/// five operations) is collapsed into one generic method per operation; the
/// twenty named tools are reconstructed by the registry on top of this port.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    /// Lists a resource, unwrapping the resource-named array from the
    /// response envelope. An empty query means "no filter".
    async fn list(&self, resource: Resource, query: &str) -> PortResult<Vec<Value>>;

    async fn get(&self, resource: Resource, id: &str) -> PortResult<Value>;

    async fn create(&self, resource: Resource, payload: Value) -> PortResult<Value>;

    /// Full-replace for patient/practitioner/invoice, partial-merge for
    /// appointment, per [`Resource::update_method`].
    async fn update(&self, resource: Resource, id: &str, payload: Value) -> PortResult<Value>;

    /// Returns `{"deleted": true}` on success.
    async fn delete(&self, resource: Resource, id: &str) -> PortResult<Value>;
}

/// Answers a question from a block of already-extracted context.
#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    async fn answer(&self, question: &str, context: &str) -> PortResult<String>;
}

/// Produces a best-effort plain-text rendering of a URL's primary content.
///
/// Extraction never errors past this boundary: every failure mode is folded
/// into the returned [`ExtractionResult`].
#[async_trait]
pub trait PageExtractionService: Send + Sync {
    async fn extract(&self, url: &str) -> ExtractionResult;

    /// Releases any process-wide resources (e.g. a browser engine). Called
    /// from the process shutdown hook; the default implementation has
    /// nothing to release.
    async fn shutdown(&self) {}
}
