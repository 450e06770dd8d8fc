//! Plan integrity hashing.
//!
//! The digest covers the plan text with its own `<!-- Validated: ... -->`
//! marker removed, so the marker can record the hash of the document that
//! contains it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

static MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- Validated: [a-f0-9]{64} -->\n?").expect("static regex"));

static MARKER_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- Validated: ([a-f0-9]{64}) -->").expect("static regex"));

/// Result of checking a plan against its embedded marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityCheck {
    pub hash: String,
    pub validated: Option<String>,
    #[serde(rename = "match")]
    pub matches: bool,
}

/// Remove the first validated marker (and its trailing newline).
pub fn strip_marker(text: &str) -> String {
    MARKER_LINE.replace(text, "").into_owned()
}

/// Hex value of the first embedded marker, if any.
pub fn embedded_hash(text: &str) -> Option<String> {
    MARKER_VALUE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// SHA-256 of the plan text excluding its marker, lowercase hex.
pub fn compute_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(strip_marker(text).as_bytes());
    hex::encode(hasher.finalize())
}

pub fn check(text: &str) -> IntegrityCheck {
    let hash = compute_hash(text);
    let validated = embedded_hash(text);
    let matches = validated.as_deref() == Some(hash.as_str());
    IntegrityCheck {
        hash,
        validated,
        matches,
    }
}

/// Replace any existing marker with one recording `hash` on the first line.
pub fn embed_marker(text: &str, hash: &str) -> String {
    format!("<!-- Validated: {hash} -->\n{}", strip_marker(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = "# Plan: Demo\n\n<objective>\nDo it\n</objective>\n";

    #[test]
    fn test_hash_is_sha256_hex() {
        let hash = compute_hash("");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_ignores_marker() {
        let hash = compute_hash(PLAN);
        let stamped = embed_marker(PLAN, &hash);
        assert!(stamped.starts_with("<!-- Validated: "));
        assert_eq!(compute_hash(&stamped), hash);
        assert_eq!(strip_marker(&stamped), PLAN);
    }

    #[test]
    fn test_check_matches_fresh_marker() {
        let stamped = embed_marker(PLAN, &compute_hash(PLAN));
        let result = check(&stamped);
        assert!(result.matches);
        assert_eq!(result.validated.as_deref(), Some(result.hash.as_str()));
    }

    #[test]
    fn test_check_detects_edit_after_stamp() {
        let stamped = embed_marker(PLAN, &compute_hash(PLAN));
        let edited = format!("{stamped}\nextra line\n");
        let result = check(&edited);
        assert!(!result.matches);
        assert!(result.validated.is_some());
    }

    #[test]
    fn test_check_without_marker() {
        let result = check(PLAN);
        assert_eq!(result.validated, None);
        assert!(!result.matches);
    }

    #[test]
    fn test_restamp_replaces_old_marker() {
        let old = embed_marker(PLAN, &"a".repeat(64));
        let restamped = embed_marker(&old, &compute_hash(&old));
        assert_eq!(restamped.matches("<!-- Validated:").count(), 1);
        assert!(check(&restamped).matches);
    }

    #[test]
    fn test_only_first_marker_is_stripped() {
        let marker = format!("<!-- Validated: {} -->\n", "b".repeat(64));
        let text = format!("{marker}body\n{marker}");
        assert_eq!(strip_marker(&text), format!("body\n{marker}"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(check(PLAN)).unwrap();
        assert!(json.get("match").is_some());
        assert!(json["validated"].is_null());
    }
}
