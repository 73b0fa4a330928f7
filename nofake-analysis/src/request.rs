//! Request bodies, validated from raw JSON so that every shape problem maps
//! to a short Spanish message instead of a deserializer error.

use crate::model::CitationStyle;
use nofake_common::{NofakeError, Result};
use serde_json::Value;

pub const CONTENT_REQUIRED: &str = "El contenido es requerido";
pub const TOPIC_REQUIRED: &str = "El tema es requerido";
pub const INVALID_FORMAT: &str = "Formato debe ser 'apa7' o 'ieee'";
pub const INVALID_ANALYZED_TEXT: &str = "El texto analizado debe ser una cadena";

/// Body of `POST /verify`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyInput {
    pub content: String,
    pub provided_url: Option<String>,
}

impl VerifyInput {
    pub fn from_json(body: &Value) -> Result<Self> {
        let content = non_empty_str(body, "content")
            .ok_or_else(|| NofakeError::Validation(CONTENT_REQUIRED.to_string()))?;
        Ok(Self {
            content: content.to_string(),
            provided_url: non_empty_str(body, "providedUrl").map(str::to_string),
        })
    }
}

/// Body of `POST /citations`.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationRequest {
    pub topic: String,
    pub style: CitationStyle,
    /// Falls back to `topic` when the caller sends none.
    pub analyzed_text: String,
}

impl CitationRequest {
    pub fn from_json(body: &Value) -> Result<Self> {
        let topic = non_empty_str(body, "topic")
            .ok_or_else(|| NofakeError::Validation(TOPIC_REQUIRED.to_string()))?;
        let style = body
            .get("format")
            .and_then(Value::as_str)
            .and_then(CitationStyle::from_name)
            .ok_or_else(|| NofakeError::Validation(INVALID_FORMAT.to_string()))?;
        let analyzed_text = match body.get("analyzedText") {
            None | Some(Value::Null) => topic.to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => topic.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(NofakeError::Validation(INVALID_ANALYZED_TEXT.to_string())),
        };
        Ok(Self {
            topic: topic.to_string(),
            style,
            analyzed_text,
        })
    }
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
