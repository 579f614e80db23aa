//! services/content_qa/src/extract/mod.rs
//!
//! The best-effort extraction pipeline: an ordered list of strategies, each
//! returning a tagged outcome. The driver tries each in order until one
//! returns a terminal result, then caps the text length. Extraction never
//! raises past this module; every failure mode degrades to a displayable
//! notice via `ExtractionResult::into_text`.

pub mod plain;
pub mod raw;
pub mod rendered;
pub mod strip;

use async_trait::async_trait;
use tracing::{info, warn};

use gateway_core::{ExtractionFailure, ExtractionResult, PageExtractionService};

pub use plain::PlainFetch;
pub use raw::RawBytes;
pub use rendered::RenderedFetch;

/// Hard cap on stored text per URL.
pub const MAX_CONTENT_CHARS: usize = 10_000;
const TRUNCATION_MARKER: &str = "... [content truncated]";

/// Below this, a page is considered to have no substantial content.
pub const MIN_CONTENT_CHARS: usize = 200;
/// Site-specific extraction below this length falls back to generic.
pub const SITE_SPECIFIC_MIN_CHARS: usize = 300;
/// Element extraction below this length falls back to whole-document text.
pub const ELEMENT_TEXT_MIN_CHARS: usize = 500;
/// Paywall marker phrases only count against pages shorter than this.
pub const PAYWALL_SUSPECT_MAX_CHARS: usize = 1_000;

/// Fixed marker phrases that suggest restricted access.
pub const PAYWALL_PHRASES: [&str; 7] = [
    "sign in",
    "log in",
    "subscribe",
    "paywall",
    "access denied",
    "please register",
    "member only",
];

/// What one extraction strategy decided about a URL.
pub enum StrategyOutcome {
    /// Terminal: this is the result, success or displayable failure.
    Done(ExtractionResult),
    /// This strategy cannot handle the URL; try the next one.
    Fallthrough(String),
}

/// One stage of the pipeline. Stages are tried in registration order.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, url: &str) -> StrategyOutcome;

    /// Releases strategy-owned resources; most strategies own none.
    async fn shutdown(&self) {}
}

/// Drives the ordered strategy list and caps result length.
pub struct ContentExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ContentExtractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }
}

#[async_trait]
impl PageExtractionService for ContentExtractor {
    async fn extract(&self, url: &str) -> ExtractionResult {
        let mut last_reason = "no extraction strategy is configured".to_string();
        for strategy in &self.strategies {
            match strategy.attempt(url).await {
                StrategyOutcome::Done(result) => {
                    info!(strategy = strategy.name(), url, "extraction finished");
                    return cap_result(result);
                }
                StrategyOutcome::Fallthrough(reason) => {
                    warn!(strategy = strategy.name(), url, reason, "strategy fell through");
                    last_reason = reason;
                }
            }
        }
        ExtractionResult::Failure(ExtractionFailure::Network(last_reason))
    }

    async fn shutdown(&self) {
        for strategy in &self.strategies {
            strategy.shutdown().await;
        }
    }
}

fn cap_result(result: ExtractionResult) -> ExtractionResult {
    match result {
        ExtractionResult::Success(text) => ExtractionResult::Success(cap_text(text)),
        ExtractionResult::ParagraphFallback(text) => {
            ExtractionResult::ParagraphFallback(cap_text(text))
        }
        failure => failure,
    }
}

/// Caps text at [`MAX_CONTENT_CHARS`] characters, appending a truncation
/// marker when trimmed. Counts characters, not bytes, so multi-byte text is
/// never split.
pub fn cap_text(text: String) -> String {
    if text.chars().count() <= MAX_CONTENT_CHARS {
        return text;
    }
    let mut capped: String = text.chars().take(MAX_CONTENT_CHARS).collect();
    capped.push('\n');
    capped.push_str(TRUNCATION_MARKER);
    capped
}

/// Post-checks shared by the fetching strategies: a minimum-length floor and
/// the paywall-phrase heuristic, applied before a result is declared good.
pub fn classify_extracted(text: String, used_fallback: bool) -> ExtractionResult {
    let length = text.trim().chars().count();
    if length < MIN_CONTENT_CHARS {
        return ExtractionResult::Failure(ExtractionFailure::ContentTooShort);
    }
    let lowered = text.to_lowercase();
    if length < PAYWALL_SUSPECT_MAX_CHARS
        && PAYWALL_PHRASES.iter().any(|phrase| lowered.contains(phrase))
    {
        return ExtractionResult::Failure(ExtractionFailure::PaywallOrLogin);
    }
    if used_fallback {
        ExtractionResult::ParagraphFallback(text)
    } else {
        ExtractionResult::Success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FallsThrough;

    #[async_trait]
    impl ExtractionStrategy for FallsThrough {
        fn name(&self) -> &'static str {
            "falls-through"
        }

        async fn attempt(&self, _url: &str) -> StrategyOutcome {
            StrategyOutcome::Fallthrough("cannot handle".to_string())
        }
    }

    struct AlwaysDone;

    #[async_trait]
    impl ExtractionStrategy for AlwaysDone {
        fn name(&self) -> &'static str {
            "always-done"
        }

        async fn attempt(&self, _url: &str) -> StrategyOutcome {
            StrategyOutcome::Done(ExtractionResult::Success("extracted".to_string()))
        }
    }

    #[tokio::test]
    async fn driver_takes_the_first_terminal_outcome() {
        let extractor = ContentExtractor::new(vec![Box::new(FallsThrough), Box::new(AlwaysDone)]);
        let result = extractor.extract("https://example.com").await;
        assert_eq!(result, ExtractionResult::Success("extracted".to_string()));
    }

    #[tokio::test]
    async fn driver_reports_failure_when_every_strategy_falls_through() {
        let extractor = ContentExtractor::new(vec![Box::new(FallsThrough)]);
        let result = extractor.extract("https://example.com").await;
        assert!(matches!(
            result,
            ExtractionResult::Failure(ExtractionFailure::Network(_))
        ));
    }

    #[test]
    fn cap_text_appends_marker_only_when_trimmed() {
        let short = cap_text("hello".to_string());
        assert_eq!(short, "hello");

        let long = cap_text("x".repeat(MAX_CONTENT_CHARS + 5));
        assert!(long.ends_with(TRUNCATION_MARKER));
        assert!(long.chars().count() < MAX_CONTENT_CHARS + TRUNCATION_MARKER.len() + 2);
    }

    #[test]
    fn classify_flags_short_content() {
        let result = classify_extracted("tiny".to_string(), false);
        assert_eq!(
            result,
            ExtractionResult::Failure(ExtractionFailure::ContentTooShort)
        );
    }

    #[test]
    fn classify_flags_short_pages_with_paywall_phrases() {
        let text = format!("Please subscribe to continue reading. {}", "a ".repeat(150));
        let result = classify_extracted(text, false);
        assert_eq!(
            result,
            ExtractionResult::Failure(ExtractionFailure::PaywallOrLogin)
        );
    }

    #[test]
    fn classify_ignores_paywall_phrases_on_long_pages() {
        let text = format!("Sign in banner. {}", "real article text ".repeat(100));
        let result = classify_extracted(text.clone(), false);
        assert_eq!(result, ExtractionResult::Success(text));
    }

    #[test]
    fn classify_tags_fallback_extractions() {
        let text = "body text ".repeat(50);
        let result = classify_extracted(text.clone(), true);
        assert_eq!(result, ExtractionResult::ParagraphFallback(text));
    }
}
