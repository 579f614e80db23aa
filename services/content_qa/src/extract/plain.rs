//! services/content_qa/src/extract/plain.rs
//!
//! Plain HTTP fetch with browser-like headers and markup stripping. Used
//! when the rendered fetch is unavailable or fell through.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;

use gateway_core::{ExtractionFailure, ExtractionResult};

use super::{classify_extracted, strip, ExtractionStrategy, StrategyOutcome};

pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/123.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

pub struct PlainFetch {
    http: Client,
}

impl PlainFetch {
    /// The client is shared with the raw-bytes backstop; it carries the
    /// transport timeout.
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ExtractionStrategy for PlainFetch {
    fn name(&self) -> &'static str {
        "plain-fetch"
    }

    async fn attempt(&self, url: &str) -> StrategyOutcome {
        let response = match self
            .http
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
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

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return StrategyOutcome::Fallthrough(format!("failed to read body: {e}")),
        };

        let (text, used_fallback) = strip::extract_readable_text(&body);
        StrategyOutcome::Done(classify_extracted(text, used_fallback))
    }
}
