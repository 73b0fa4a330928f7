//! Best-effort recovery of a JSON payload from free-form model output.
//!
//! Models wrap answers in ```` ```json ```` fences, prepend prose, or stop
//! halfway. Extraction never fails: the outcome is a tagged value the caller
//! repairs or replaces with a local default.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("static regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```$").expect("static regex"));

/// Result of pulling structured data out of oracle text.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    /// A JSON object or array was recovered.
    Found(Value),
    /// No `{...}` span exists in the text.
    NotFound,
    /// A candidate span existed but did not parse.
    Malformed(String),
}

impl JsonExtraction {
    pub fn into_value(self) -> Option<Value> {
        match self {
            JsonExtraction::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            JsonExtraction::Found(_) => "found",
            JsonExtraction::NotFound => "not_found",
            JsonExtraction::Malformed(_) => "malformed",
        }
    }
}

/// Remove one leading ```` ```lang ```` line and one trailing ```` ``` ````.
///
/// ```
/// use nofake_llm::extract::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
/// ```
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let start = LEADING_FENCE.find(trimmed).map(|m| m.end()).unwrap_or(0);
    let rest = &trimmed[start..];
    let end = TRAILING_FENCE
        .find(rest)
        .map(|m| m.start())
        .unwrap_or(rest.len());
    rest[..end].trim()
}

/// Recover the JSON payload from oracle text.
///
/// Tries the fence-stripped text as a whole first, then the widest
/// `{ ... }` span (first `{` to last `}`).
pub fn extract_json(raw: &str) -> JsonExtraction {
    let stripped = strip_code_fences(raw);

    if let Ok(v @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(stripped) {
        return JsonExtraction::Found(v);
    }

    let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) else {
        return JsonExtraction::NotFound;
    };
    if end < start {
        return JsonExtraction::NotFound;
    }

    match serde_json::from_str::<Value>(&stripped[start..=end]) {
        Ok(v) => JsonExtraction::Found(v),
        Err(e) => JsonExtraction::Malformed(e.to_string()),
    }
}
