//! services/content_qa/src/extract/raw.rs
//!
//! Terminal backstop: when markup-aware extraction was unavailable, return
//! the leading bytes of the response as lossy UTF-8. The driver applies the
//! length cap.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;

use gateway_core::{ExtractionFailure, ExtractionResult};

use super::plain::BROWSER_USER_AGENT;
use super::{ExtractionStrategy, StrategyOutcome, MIN_CONTENT_CHARS};

pub struct RawBytes {
    http: Client,
}

impl RawBytes {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ExtractionStrategy for RawBytes {
    fn name(&self) -> &'static str {
        "raw-bytes"
    }

    async fn attempt(&self, url: &str) -> StrategyOutcome {
        let response = match self
            .http
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return StrategyOutcome::Fallthrough(format!("request failed: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            return StrategyOutcome::Done(ExtractionResult::Failure(
                ExtractionFailure::HttpStatus(status.as_u16()),
            ));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return StrategyOutcome::Fallthrough(format!("failed to read body: {e}")),
        };

        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.trim().chars().count() < MIN_CONTENT_CHARS {
            return StrategyOutcome::Done(ExtractionResult::Failure(
                ExtractionFailure::ContentTooShort,
            ));
        }
        StrategyOutcome::Done(ExtractionResult::ParagraphFallback(text))
    }
}
