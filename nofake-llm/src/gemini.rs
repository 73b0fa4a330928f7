use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use nofake_common::{NofakeError, Result};
use nofake_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

const JSON_MIME: &str = "application/json";
const BLOCKED_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: [TextPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Usage {
    total_token_count: Option<u32>,
}

impl GenerateContentReply {
    /// Joined text of the first candidate plus the token count.
    fn into_text(self) -> Result<(String, Option<u32>)> {
        let tokens = self.usage_metadata.and_then(|u| u.total_token_count);
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| NofakeError::Oracle("Gemini returned no candidates".into()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(NofakeError::Oracle(
                "Content blocked by Gemini safety filters".into(),
            ));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(NofakeError::Oracle("Gemini returned empty text".into()));
        }
        Ok((text, tokens))
    }
}

fn gemini_error(err: HttpError) -> NofakeError {
    NofakeError::Oracle(match (err.status(), err) {
        (Some(StatusCode::TOO_MANY_REQUESTS), _) => "Rate limit exceeded".to_string(),
        (Some(StatusCode::UNAUTHORIZED), _) => "Invalid API key".to_string(),
        (Some(StatusCode::FORBIDDEN), _) => "API access forbidden".to_string(),
        (
            _,
            HttpError::Api {
                status, message, ..
            },
        ) => format!("Gemini API error ({status}): {message}"),
        (_, HttpError::Decode(e, _)) => format!("Failed to parse Gemini response: {e}"),
        (_, other) => format!("Gemini request failed: {other}"),
    })
}

fn http_client(base_url: &str) -> Result<HttpClient> {
    Ok(HttpClient::new(base_url)
        .map_err(|e| NofakeError::Config(format!("Failed to create HTTP client: {e}")))?
        .with_timeout(Duration::from_secs(60)))
}

/// Google Gemini `generateContent` client.
///
/// Asks for `application/json` output by default since every NoFake prompt
/// expects a JSON answer; callers still treat the text as untrusted.
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
    json_mode: bool,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Ok(Self {
            http: http_client(GEMINI_BASE_URL)?,
            api_key,
            model,
            json_mode: true,
        })
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let root = format!("{}/", base_url.trim_end_matches('/'));
        self.http = http_client(&root)?;
        Ok(self)
    }

    /// Toggle the `responseMimeType: application/json` hint.
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let path = format!("models/{}:generateContent", self.model);
        let body = GenerateContentBody {
            contents: [Content::text(prompt)],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: max_tokens,
                response_mime_type: self.json_mode.then_some(JSON_MIME),
            },
            safety_settings: BLOCKED_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                })
                .collect(),
            system_instruction: system_prompt.map(Content::text),
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "gemini.generate.start");

        // Each call is attempted once; callers fall back locally instead.
        let opts = RequestOpts {
            retries: Some(0),
            auth: Auth::Query {
                name: "key",
                value: self.api_key.as_str().into(),
            },
            ..Default::default()
        };
        let reply: GenerateContentReply = self
            .http
            .post_json_opts(&path, &body, opts)
            .await
            .map_err(gemini_error)?;
        let (text, tokens_used) = reply.into_text()?;
        tracing::debug!(model = %self.model, ?tokens_used, "gemini.generate.done");

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .generate(r#"Responde con {"ok": true}"#, None, Some(16), Some(0.0))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, "gemini.health.failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
