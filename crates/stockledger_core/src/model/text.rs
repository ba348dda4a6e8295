//! Free-text normalization for user-entered labels and metadata.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Trims `value` and collapses every internal whitespace run to one space.
pub fn normalize_label(value: &str) -> String {
    WHITESPACE_RUN_RE
        .replace_all(value.trim(), " ")
        .into_owned()
}

/// Normalizes optional metadata; blank input becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_label)
        .filter(|normalized| !normalized.is_empty())
}
