//! services/clinic_api/src/bin/clinic_api.rs

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clinic_api_lib::{
    adapters::ClinikoClient,
    config::Config,
    error::ApiError,
    web::{call_tool_handler, health_handler, list_tools_handler, reference_handler, state::AppState},
};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");
    if !config.api_key_configured() {
        info!("CLINIKO_API_KEY is not set; tool calls will return configuration errors");
    }

    // --- 2. Initialize the Remote API Adapter ---
    let clinic = Arc::new(ClinikoClient::new(
        &config.cliniko_base_url,
        config.cliniko_api_key.as_deref(),
    ));

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        clinic,
        config: config.clone(),
    });

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/health", get(health_handler))
        .route("/reference", get(reference_handler))
        .route("/tools", get(list_tools_handler))
        .route("/tools/{name}", post(call_tool_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new().merge(api_router).merge(
        SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", clinic_api_lib::web::rest::ApiDoc::openapi()),
    );

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
