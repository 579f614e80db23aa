//! services/content_qa/src/extract/strip.rs
//!
//! Markup stripping for plain HTTP fetches: parse the document, skip
//! non-content subtrees, and concatenate the text of content-bearing tags,
//! falling back to whole-body text when that yields too little.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::ELEMENT_TEXT_MIN_CHARS;

/// Subtrees that never carry readable content.
const SKIP_TAGS: [&str; 7] = [
    "script", "style", "nav", "footer", "header", "aside", "noscript",
];

static CONTENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, h1, h2, h3, h4, h5, article, section").expect("valid content selector")
});

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));

/// Extracts readable text from an HTML document. Returns the text and
/// whether the whole-body fallback was used instead of content-tag
/// extraction.
pub fn extract_readable_text(html: &str) -> (String, bool) {
    let document = Html::parse_document(html);

    let mut blocks = Vec::new();
    for element in document.select(&CONTENT_SELECTOR) {
        let text = visible_text(element);
        if !text.is_empty() {
            blocks.push(text);
        }
    }
    let content = blocks.join("\n");
    if content.chars().count() >= ELEMENT_TEXT_MIN_CHARS {
        return (content, false);
    }

    // Too little from content tags; take everything visible in the body.
    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .map(visible_text)
        .unwrap_or_default();
    if body.chars().count() > content.chars().count() {
        (body, true)
    } else {
        (content, false)
    }
}

/// Concatenates the text nodes under an element, skipping non-content
/// subtrees and collapsing whitespace.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    collect_text(root, &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, parts);
        }
    }
}
