//! crates/gateway_core/src/domain.rs
//!
//! Defines the pure, core data structures for both gateway services.
//! These types are independent of any HTTP client or serialization target.

use std::fmt;

/// The remote entity types exposed by the clinic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Patient,
    Appointment,
    Invoice,
    Practitioner,
}

/// HTTP method the remote API expects for updates of a given resource.
///
/// The remote API is asymmetric here: appointments are updated with a
/// partial-merge PATCH, everything else with a full-replace PUT. The
/// gateway does not normalize this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMethod {
    Put,
    Patch,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Patient,
        Resource::Appointment,
        Resource::Invoice,
        Resource::Practitioner,
    ];

    /// Singular name, used in tool names and ID field names.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Patient => "patient",
            Resource::Appointment => "appointment",
            Resource::Invoice => "invoice",
            Resource::Practitioner => "practitioner",
        }
    }

    /// URL path segment on the remote API, which doubles as the key of the
    /// list-response envelope (`{"patients": [...]}` etc.).
    pub fn plural(&self) -> &'static str {
        match self {
            Resource::Patient => "patients",
            Resource::Appointment => "appointments",
            Resource::Invoice => "invoices",
            Resource::Practitioner => "practitioners",
        }
    }

    pub fn update_method(&self) -> UpdateMethod {
        match self {
            Resource::Appointment => UpdateMethod::Patch,
            _ => UpdateMethod::Put,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a page extraction produced no usable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The page could not be fetched at all.
    Network(String),
    /// The server answered with a non-2xx status.
    HttpStatus(u16),
    /// Login redirect or paywall markers were detected.
    PaywallOrLogin,
    /// The page loaded but yielded less text than the minimum threshold.
    ContentTooShort,
}

/// Outcome of extracting one URL.
///
/// Extraction never fails hard: every variant renders to a displayable
/// string via [`ExtractionResult::into_text`], so downstream consumers
/// treat all session text uniformly as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Content-bearing elements were extracted.
    Success(String),
    /// Element extraction yielded too little; whole-document text was used.
    ParagraphFallback(String),
    /// No usable content; the reason is rendered as the stored text.
    Failure(ExtractionFailure),
}

impl ExtractionResult {
    /// Render the outcome as the text stored for the URL. Failures become
    /// human-readable notices embedding the URL.
    pub fn into_text(self, url: &str) -> String {
        match self {
            ExtractionResult::Success(text) | ExtractionResult::ParagraphFallback(text) => text,
            ExtractionResult::Failure(ExtractionFailure::Network(err)) => format!(
                "Failed to extract content from {url} after trying multiple methods. Error: {err}"
            ),
            ExtractionResult::Failure(ExtractionFailure::HttpStatus(status)) => format!(
                "Failed to extract content from {url}. The server responded with HTTP status {status}."
            ),
            ExtractionResult::Failure(ExtractionFailure::PaywallOrLogin) => format!(
                "The content at {url} appears to be behind a paywall or requires a subscription."
            ),
            ExtractionResult::Failure(ExtractionFailure::ContentTooShort) => format!(
                "Failed to extract substantial content from {url}. The content might be behind a paywall or requires authentication."
            ),
        }
    }

    /// Whether the outcome should be reported in `extraction_warnings`.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionResult::Failure(_))
    }
}
