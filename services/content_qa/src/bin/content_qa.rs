//! services/content_qa/src/bin/content_qa.rs

use std::sync::Arc;
use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client};
use axum::routing::{get, post};
use axum::Router;
use content_qa_lib::{
    adapters::OpenAiQaAdapter,
    config::Config,
    error::ApiError,
    extract::{ContentExtractor, ExtractionStrategy, PlainFetch, RawBytes, RenderedFetch},
    web::{ask_handler, health_handler, rest::ApiDoc, scrape_handler, state::AppState},
};
use gateway_core::{PageExtractionService, SessionStore};
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
    if config.openai_api_key.is_none() {
        info!("OPENAI_API_KEY is not set; answers will use the offline fallback");
    }

    // --- 2. Build the Extraction Pipeline ---
    // Strategies run in order: rendered fetch (when enabled), plain fetch
    // with markup stripping, then the raw-bytes backstop.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client");

    let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
    if config.browser_enabled {
        strategies.push(Box::new(RenderedFetch::new()));
    } else {
        info!("browser rendering disabled; using plain fetches only");
    }
    strategies.push(Box::new(PlainFetch::new(http.clone())));
    strategies.push(Box::new(RawBytes::new(http)));
    let extractor = Arc::new(ContentExtractor::new(strategies));

    // --- 3. Initialize the Completion Adapter ---
    let mut openai_config = OpenAIConfig::new();
    if let Some(key) = &config.openai_api_key {
        openai_config = openai_config.with_api_key(key);
    }
    if let Some(base) = &config.openai_api_base {
        openai_config = openai_config.with_api_base(base);
    }
    let qa = Arc::new(OpenAiQaAdapter::new(
        Client::with_config(openai_config),
        config.qa_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store: Arc::new(SessionStore::new()),
        extractor: extractor.clone(),
        qa,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/scrape", post(scrape_handler))
        .route("/api/ask", post(ask_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The browser engine leaks its child process unless released here.
    extractor.shutdown().await;
    info!("Shutdown complete.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
    }
}
