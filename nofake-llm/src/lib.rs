//! Provider‑agnostic oracle integration for NoFake.
//!
//! This crate exposes a common [`traits::LlmClient`] interface, concrete
//! Gemini and OpenAI implementations, and [`extract`] helpers that recover
//! JSON from free-form model output.
//!
//! # Examples
//! ```
//! use nofake_common::LlmConfig;
//! use nofake_llm::client_from_config;
//!
//! // No credential: no oracle, and that is not an error.
//! let client = client_from_config(&LlmConfig::None).unwrap();
//! assert!(client.is_none());
//! ```
pub mod extract;
pub mod gemini;
pub mod openai;
pub mod traits;

use gemini::GeminiClient;
use nofake_common::LlmConfig;
use openai::OpenAiClient;
use std::sync::Arc;
use traits::LlmClient;

/// Shared handle to whichever oracle is configured.
pub type SharedLlm = Arc<dyn LlmClient + Send + Sync + 'static>;

/// Build the configured oracle client.
///
/// Returns `Ok(None)` when the configuration has no usable credential;
/// handlers then take their local fallback path.
pub fn client_from_config(config: &LlmConfig) -> nofake_common::Result<Option<SharedLlm>> {
    if !config.has_credential() {
        tracing::warn!("no oracle credential configured, using local analysis only");
        return Ok(None);
    }

    match config {
        LlmConfig::Gemini {
            api_key,
            model,
            json_mode,
        } => {
            let client =
                GeminiClient::new(api_key.clone(), model.clone())?.with_json_mode(*json_mode);
            Ok(Some(Arc::new(client)))
        }
        LlmConfig::OpenAi {
            api_key,
            model,
            base_url,
        } => {
            let client = OpenAiClient::new(api_key.clone(), model.clone(), base_url.as_deref())?;
            Ok(Some(Arc::new(client)))
        }
        LlmConfig::None => Ok(None),
    }
}
