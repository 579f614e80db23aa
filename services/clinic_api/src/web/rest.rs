//! services/clinic_api/src/web/rest.rs
//!
//! Contains the Axum handlers for the non-tool REST endpoints and the
//! master definition for the OpenAPI specification.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::{OpenApi, ToSchema};

use crate::constants;
use crate::web::state::AppState;
use crate::web::tools::ToolSpec;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        reference_handler,
        crate::web::tools::list_tools_handler,
        crate::web::tools::call_tool_handler,
    ),
    components(schemas(HealthResponse, ToolSpec)),
    tags(
        (name = "Clinic Gateway API", description = "Tool-calling gateway over a remote clinic-management API.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Liveness plus whether the remote API credential is configured.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_key_configured: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Health check endpoint for deployment monitoring.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is live", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        api_key_configured: app_state.config.api_key_configured(),
    })
}

/// Default identifiers and worked example payloads for automated callers.
#[utoipa::path(
    get,
    path = "/reference",
    responses((status = 200, description = "Default IDs and example payloads"))
)]
pub async fn reference_handler() -> Json<Value> {
    Json(json!({
        "defaults": constants::defaults(),
        "examples": {
            "minimal_patient": constants::minimal_patient_example(),
            "complete_patient": constants::complete_patient_example(),
            "appointment": constants::appointment_example(),
            "appointment_update": constants::appointment_update_example(),
        },
    }))
}

//=========================================================================================
// Tests
//=========================================================================================
