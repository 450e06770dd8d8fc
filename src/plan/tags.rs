//! XML-like tag extraction over plan markdown.
//!
//! Plans embed their structure in lightweight tags (`<objective>`,
//! `<tasks>`, `<new-files>`, ...). The opening tag must start a line so that
//! tag names quoted inside prose or backtick spans are not mistaken for
//! structure; the closing tag may appear anywhere after it.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use regex::Regex;

/// Compiled patterns for one tag name.
#[derive(Debug)]
struct TagPatterns {
    block: Regex,
    pair: Regex,
}

impl TagPatterns {
    fn compile(tag: &str) -> Option<Self> {
        let name = regex::escape(tag);
        Some(Self {
            block: Regex::new(&format!(r"(?im)^\s*<{name}[^>]*>([\s\S]*?)</{name}>")).ok()?,
            pair: Regex::new(&format!(r"(?is)<{name}>.*?</{name}>")).ok()?,
        })
    }
}

/// Patterns are compiled once per tag name for the life of the process.
static PATTERNS: LazyLock<RwLock<HashMap<String, Arc<TagPatterns>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn patterns(tag: &str) -> Option<Arc<TagPatterns>> {
    let key = tag.to_lowercase();
    if let Some(found) = PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Some(Arc::clone(found));
    }

    let compiled = Arc::new(TagPatterns::compile(&key)?);
    let mut cache = PATTERNS.write().unwrap_or_else(PoisonError::into_inner);
    Some(Arc::clone(cache.entry(key).or_insert(compiled)))
}

/// Return the trimmed content of the first `<tag ...>...</tag>` block.
///
/// Matching is case-insensitive and the opening tag must be the first
/// non-whitespace token on its line. Absence is `None`, never an error.
pub fn extract_tag(text: &str, tag: &str) -> Option<String> {
    patterns(tag)?
        .block
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Like [`extract_tag`] but maps absence to an empty string.
pub fn extract_tag_or_empty(text: &str, tag: &str) -> String {
    extract_tag(text, tag).unwrap_or_default()
}

/// Whether a bare `<tag>...</tag>` pair occurs anywhere in the text.
///
/// Used for required-section checks, which accept the tag at any position.
pub fn has_tag(text: &str, tag: &str) -> bool {
    patterns(tag).is_some_and(|p| p.pair.is_match(text))
}
