//! services/content_qa/src/extract/rendered.rs
//!
//! Headless-browser rendered fetch for JavaScript-heavy pages. The browser
//! is launched lazily once per process and reused across calls; `shutdown`
//! must run at process exit or the child browser process leaks.
//!
//! Academic-publisher domains get element-targeted extraction (title,
//! abstract, section headings, paragraphs); everything else gets a generic
//! in-page extraction that removes non-content elements first. Any
//! navigation or evaluation error falls through to the plain-fetch stage.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use gateway_core::{ExtractionFailure, ExtractionResult};

use super::{classify_extracted, ExtractionStrategy, StrategyOutcome, SITE_SPECIFIC_MIN_CHARS};

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);
/// Settle time after the load event, standing in for a network-idle wait.
const SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Substrings in the post-redirect URL that indicate a login wall.
const LOGIN_URL_MARKERS: [&str; 3] = ["login", "sign-in", "access-denied"];

/// Domains that get the element-targeted academic extraction.
const ACADEMIC_DOMAINS: [&str; 7] = [
    "sciencedirect.com",
    "springer.com",
    "ieee.org",
    "wiley.com",
    "elsevier.com",
    "nature.com",
    "academic.oup.com",
];

/// Element-targeted extraction for academic publishers: cookie-banner
/// accept, then title, abstract, and section headings + paragraphs.
const ACADEMIC_EXTRACTION_JS: &str = r#"
(() => {
    const cookie = document.querySelector('button#onetrust-accept-btn-handler');
    if (cookie) cookie.click();

    let content = '';
    const title = document.querySelector('h1.title-text, h1');
    if (title) content += 'Title: ' + title.textContent.trim() + '\n\n';

    const abstract = document.querySelector('.abstract, .Abstract, #abstract');
    if (abstract) content += 'Abstract: ' + abstract.textContent.trim() + '\n\n';

    const sections = document.querySelectorAll('section.section, div.section, div.Section, article section');
    sections.forEach(section => {
        const heading = section.querySelector('h2, h3, h4');
        if (heading) content += '\n' + heading.textContent.trim() + '\n';
        section.querySelectorAll('p').forEach(p => {
            content += p.textContent.trim() + '\n';
        });
    });
    return content;
})()
"#;

/// Generic extraction: remove non-content elements, concatenate visible
/// text from content-bearing elements, fall back to whole-document text.
const GENERIC_EXTRACTION_JS: &str = r#"
(() => {
    const elementsToRemove = document.querySelectorAll('script, style, nav, footer, header, aside, .cookie-banner, .ad');
    elementsToRemove.forEach(el => { if (el) el.remove(); });

    const textElements = document.querySelectorAll('p, h1, h2, h3, h4, h5, article, section, .content, .article-content, .post-content');
    let text = '';
    textElements.forEach(el => {
        if (el.offsetParent !== null) {
            text += el.textContent + '\n';
        }
    });

    if (text.length < 500) {
        return JSON.stringify({ text: document.body.innerText, fallback: true });
    }
    return JSON.stringify({ text: text, fallback: false });
})()
"#;

#[derive(Deserialize)]
struct GenericExtraction {
    text: String,
    fallback: bool,
}

struct BrowserHandle {
    browser: Browser,
    event_loop: JoinHandle<()>,
}

pub struct RenderedFetch {
    /// Lazily launched once per process and reused across calls. The lock
    /// also serializes rendered extractions; concurrent scrapes queue here.
    handle: Mutex<Option<BrowserHandle>>,
}

impl RenderedFetch {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    async fn launch() -> Result<BrowserHandle, String> {
        info!("launching headless browser");
        let config = BrowserConfig::builder()
            .args(vec![
                "--disable-web-security",
                "--disable-features=IsolateOrigins",
                "--disable-site-isolation-trials",
            ])
            .build()?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| format!("browser launch failed: {e}"))?;

        // The handler stream must be driven for the browser connection to
        // make progress.
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(BrowserHandle {
            browser,
            event_loop,
        })
    }

    async fn extract_with_page(&self, page: &Page, url: &str) -> StrategyOutcome {
        // A redirect to a login or access-denied page is terminal.
        if let Ok(current) = page.url().await {
            let current = current.map(|u| u.to_string()).unwrap_or_default();
            let lowered = current.to_lowercase();
            if LOGIN_URL_MARKERS.iter().any(|m| lowered.contains(m)) {
                warn!(url, redirected_to = %current, "redirected to a login or access-denied page");
                return StrategyOutcome::Done(ExtractionResult::Failure(
                    ExtractionFailure::PaywallOrLogin,
                ));
            }
        }

        let lowered_url = url.to_lowercase();
        let is_academic = ACADEMIC_DOMAINS.iter().any(|d| lowered_url.contains(d));

        let mut text = String::new();
        let mut used_fallback = false;

        if is_academic {
            debug!(url, "using academic-publisher extraction");
            match page.evaluate(ACADEMIC_EXTRACTION_JS).await {
                Ok(result) => text = result.into_value::<String>().unwrap_or_default(),
                Err(e) => {
                    return StrategyOutcome::Fallthrough(format!(
                        "academic extraction failed: {e}"
                    ))
                }
            }
        }

        if text.chars().count() < SITE_SPECIFIC_MIN_CHARS {
            debug!(url, "using generic in-page extraction");
            // The script returns a JSON string; string primitives always
            // cross the protocol by value.
            let encoded = match page.evaluate(GENERIC_EXTRACTION_JS).await {
                Ok(result) => result.into_value::<String>().unwrap_or_default(),
                Err(e) => {
                    return StrategyOutcome::Fallthrough(format!("generic extraction failed: {e}"))
                }
            };
            match serde_json::from_str::<GenericExtraction>(&encoded) {
                Ok(extraction) => {
                    text = extraction.text;
                    used_fallback = extraction.fallback;
                }
                Err(e) => {
                    return StrategyOutcome::Fallthrough(format!(
                        "generic extraction returned an unexpected value: {e}"
                    ))
                }
            }
        }

        StrategyOutcome::Done(classify_extracted(text, used_fallback))
    }
}

impl Default for RenderedFetch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionStrategy for RenderedFetch {
    fn name(&self) -> &'static str {
        "rendered-fetch"
    }

    async fn attempt(&self, url: &str) -> StrategyOutcome {
        let mut guard = self.handle.lock().await;
        if guard.is_none() {
            match Self::launch().await {
                Ok(handle) => *guard = Some(handle),
                Err(e) => return StrategyOutcome::Fallthrough(e),
            }
        }
        let handle = guard.as_ref().expect("browser handle just initialized");

        let page = match handle.browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => return StrategyOutcome::Fallthrough(format!("failed to open page: {e}")),
        };

        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };
        let outcome = match timeout(NAVIGATION_TIMEOUT, navigation).await {
            Ok(Ok(())) => {
                sleep(SETTLE_DELAY).await;
                self.extract_with_page(&page, url).await
            }
            Ok(Err(e)) => StrategyOutcome::Fallthrough(format!("navigation failed: {e}")),
            Err(_) => StrategyOutcome::Fallthrough(format!(
                "navigation timed out after {}s",
                NAVIGATION_TIMEOUT.as_secs()
            )),
        };

        // The page is closed either way; the browser itself stays up for
        // the next call.
        if let Err(e) = page.close().await {
            warn!(url, error = %e, "failed to close page");
        }

        outcome
    }

    async fn shutdown(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(mut handle) = guard.take() {
            info!("closing headless browser");
            if let Err(e) = handle.browser.close().await {
                warn!(error = %e, "failed to close browser cleanly");
            }
            handle.event_loop.abort();
        }
    }
}
