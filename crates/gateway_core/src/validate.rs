//! crates/gateway_core/src/validate.rs
//!
//! Small composable field validators, applied uniformly per field by the
//! clinic tool registry. Each returns `Ok(())` or `Err(reason)` so callers
//! can collect reasons into structured error payloads.

use std::sync::LazyLock;

use regex::Regex;

static ISO_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid datetime regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Remote-side identifiers are opaque decimal strings longer than 10
/// characters. Anything else is rejected before a remote call is attempted.
pub fn id_format(value: &str) -> Result<(), String> {
    if value.len() > 10 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("Must be a string of digits longer than 10 characters.".to_string())
    }
}

/// ISO datetime with a `Z` suffix: `YYYY-MM-DDTHH:MM:SSZ`, exactly.
pub fn iso_datetime(value: &str) -> Result<(), String> {
    if ISO_DATETIME_RE.is_match(value) {
        Ok(())
    } else {
        Err("Must be an ISO datetime with Z suffix: YYYY-MM-DDTHH:MM:SSZ.".to_string())
    }
}

/// Calendar date: `YYYY-MM-DD`.
pub fn date(value: &str) -> Result<(), String> {
    if DATE_RE.is_match(value) {
        Ok(())
    } else {
        Err("Must be a date in YYYY-MM-DD format.".to_string())
    }
}

/// Standard local@domain email shape.
pub fn email(value: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err("Must be a valid email address like user@example.com.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_format_requires_digits_and_length() {
        assert!(id_format("123").is_err());
        assert!(id_format("1234567890X").is_err());
        assert!(id_format("12345678901").is_ok());
        assert!(id_format("1764028746571981724").is_ok());
        assert!(id_format("").is_err());
    }

    #[test]
    fn iso_datetime_requires_exact_shape() {
        assert!(iso_datetime("2025-09-05T10:00:00Z").is_ok());
        assert!(iso_datetime("2025-09-05 10:00:00").is_err());
        assert!(iso_datetime("2025-09-05T10:00:00").is_err());
        assert!(iso_datetime("2025-9-5T10:00:00Z").is_err());
        assert!(iso_datetime("x2025-09-05T10:00:00Z").is_err());
    }

    #[test]
    fn date_requires_exact_shape() {
        assert!(date("1985-03-15").is_ok());
        assert!(date("1985-3-15").is_err());
        assert!(date("15/03/1985").is_err());
    }

    #[test]
    fn email_requires_local_at_domain() {
        assert!(email("john.smith@email.com").is_ok());
        assert!(email("user+tag@sub.example.co").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(email("missing@tld").is_err());
    }
}
