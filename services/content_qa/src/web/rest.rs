//! services/content_qa/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Extraction failures never surface as HTTP errors: degraded outcomes are
//! stored as displayable text and reported through `extraction_warnings`.
//! The only true error on this surface is asking against an unknown
//! session, which is a 404.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::answer;
use crate::web::state::AppState;

/// Stored text shorter than this is reported as an extraction warning even
/// when it did not degrade to a failure notice.
const WARN_CONTENT_CHARS: usize = 300;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(scrape_handler, ask_handler, health_handler),
    components(schemas(ScrapeRequest, ScrapeResponse, AskRequest, AskResponse, HealthResponse)),
    tags(
        (name = "Content Q&A API", description = "Extracts readable text from web pages and answers questions about it.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
    /// Reuse an existing session to accumulate more pages; omit to start a
    /// new one.
    pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ScrapeResponse {
    pub status: &'static str,
    pub session_id: String,
    pub urls_processed: usize,
    /// URLs whose extraction degraded to a failure/paywall notice or came
    /// back suspiciously short.
    pub extraction_warnings: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Serialize, ToSchema)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Extract content from the given URLs into a session.
#[utoipa::path(
    post,
    path = "/api/scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "URLs processed into the session", body = ScrapeResponse),
        (status = 400, description = "No URLs provided")
    )
)]
pub async fn scrape_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, (StatusCode, String)> {
    if input.urls.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No URLs provided".to_string()));
    }

    let session_id = input
        .session_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut pages = IndexMap::new();
    let mut extraction_warnings = Vec::new();
    for url in &input.urls {
        let result = app_state.extractor.extract(url).await;
        let degraded = result.is_degraded();
        let text = result.into_text(url);
        if degraded || text.chars().count() < WARN_CONTENT_CHARS {
            extraction_warnings.push(url.clone());
        }
        // Failure notices are stored as content too; the answer engine
        // treats all session text uniformly.
        pages.insert(url.clone(), text);
    }

    let urls_processed = input.urls.len();
    app_state.store.merge(&session_id, pages);
    info!(
        session_id,
        urls_processed,
        warnings = extraction_warnings.len(),
        "scrape complete"
    );

    Ok(Json(ScrapeResponse {
        status: "success",
        session_id,
        urls_processed,
        extraction_warnings,
    }))
}

/// Answer a question using only the session's extracted content.
#[utoipa::path(
    post,
    path = "/api/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "An answer grounded in the session content", body = AskResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn ask_handler(
    State(app_state): State<Arc<AppState>>,
    Json(input): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let Some(pages) = app_state.store.get(&input.session_id) else {
        return Err((
            StatusCode::NOT_FOUND,
            "Session not found. Please extract content first.".to_string(),
        ));
    };

    let context = answer::assemble_context(&pages);
    let answer = match app_state.qa.answer(&input.question, &context).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, "completion call failed; using offline fallback answer");
            let preview = answer::context_preview(pages.values().map(String::as_str));
            answer::offline_answer(&input.question, &preview)
        }
    };

    Ok(Json(AskResponse { answer }))
}

/// Simple health check endpoint.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is live", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "web-content-qa",
    })
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use gateway_core::{
        ExtractionFailure, ExtractionResult, PageExtractionService, PortError, PortResult,
        QuestionAnsweringService, SessionStore,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;

    /// Succeeds with long text unless the URL mentions a paywall.
    struct StubExtractor;

    #[async_trait]
    impl PageExtractionService for StubExtractor {
        async fn extract(&self, url: &str) -> ExtractionResult {
            if url.contains("paywalled") {
                ExtractionResult::Failure(ExtractionFailure::PaywallOrLogin)
            } else {
                ExtractionResult::Success("substantial page text. ".repeat(30))
            }
        }
    }

    struct StubQa {
        fail: bool,
    }

    #[async_trait]
    impl QuestionAnsweringService for StubQa {
        async fn answer(&self, question: &str, _context: &str) -> PortResult<String> {
            if self.fail {
                Err(PortError::Unexpected("completion API unreachable".to_string()))
            } else {
                Ok(format!("remote answer to: {question}"))
            }
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().expect("test bind address"),
            log_level: tracing::Level::INFO,
            openai_api_key: None,
            openai_api_base: None,
            qa_model: "gpt-4o-mini".to_string(),
            browser_enabled: false,
        }
    }

    fn test_app(fail_qa: bool) -> (Router, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new());
        let state = Arc::new(AppState {
            store: store.clone(),
            extractor: Arc::new(StubExtractor),
            qa: Arc::new(StubQa { fail: fail_qa }),
            config: Arc::new(test_config()),
        });
        let app = Router::new()
            .route("/api/scrape", post(scrape_handler))
            .route("/api/ask", post(ask_handler))
            .route("/api/health", get(health_handler))
            .with_state(state);
        (app, store)
    }

    async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn scrape_rejects_empty_url_list() {
        let (app, _store) = test_app(false);
        let (status, _) = post_json(&app, "/api/scrape", json!({ "urls": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scrape_merges_into_the_same_session() {
        let (app, store) = test_app(false);

        let (status, body) = post_json(
            &app,
            "/api/scrape",
            json!({ "urls": ["https://a"], "session_id": "s1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], json!("s1"));

        let (status, _) = post_json(
            &app,
            "/api/scrape",
            json!({ "urls": ["https://b"], "session_id": "s1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let session = store.get("s1").expect("session exists");
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn scrape_generates_a_session_id_when_absent() {
        let (app, store) = test_app(false);
        let (status, body) = post_json(&app, "/api/scrape", json!({ "urls": ["https://a"] })).await;
        assert_eq!(status, StatusCode::OK);
        let session_id = body["session_id"].as_str().expect("session id");
        assert!(!session_id.is_empty());
        assert!(store.get(session_id).is_some());
    }

    #[tokio::test]
    async fn scrape_reports_degraded_urls_as_warnings() {
        let (app, store) = test_app(false);
        let (status, body) = post_json(
            &app,
            "/api/scrape",
            json!({ "urls": ["https://ok", "https://paywalled"], "session_id": "s1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["urls_processed"], json!(2));
        assert_eq!(body["extraction_warnings"], json!(["https://paywalled"]));

        // The paywall notice is still stored as session content.
        let session = store.get("s1").expect("session exists");
        assert!(session["https://paywalled"].contains("paywall"));
    }

    #[tokio::test]
    async fn ask_unknown_session_is_not_found() {
        let (app, _store) = test_app(false);
        let (status, _) = post_json(
            &app,
            "/api/ask",
            json!({ "session_id": "missing", "question": "anything?" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ask_returns_the_remote_answer() {
        let (app, _store) = test_app(false);
        post_json(
            &app,
            "/api/scrape",
            json!({ "urls": ["https://a"], "session_id": "s1" }),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/api/ask",
            json!({ "session_id": "s1", "question": "what is this?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["answer"].as_str().unwrap().contains("remote answer"));
    }

    #[tokio::test]
    async fn ask_degrades_to_offline_answer_when_completion_fails() {
        let (app, _store) = test_app(true);
        post_json(
            &app,
            "/api/scrape",
            json!({ "urls": ["https://a"], "session_id": "s1" }),
        )
        .await;

        let (status, body) = post_json(
            &app,
            "/api/ask",
            json!({ "session_id": "s1", "question": "what is this page about?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let answer = body["answer"].as_str().unwrap();
        assert!(!answer.is_empty());
        assert!(!answer.contains("unreachable"));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _store) = test_app(false);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
