//! JSON extraction from model replies.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Pull a JSON value out of a model reply.
///
/// Tries a fenced ```` ```json ```` block first, then the outermost
/// `{ ... }` span, then the whole text. Returns `None` if nothing parses.
pub fn extract_json(text: &str) -> Option<Value> {
    static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```json\s*\n(.*?)\n\s*```").expect("valid regex")
    });
    static OBJECT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    let candidate = FENCED_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .or_else(|| OBJECT_RE.find(text))
        .map_or(text, |m| m.as_str());

    serde_json::from_str(candidate.trim()).ok()
}
