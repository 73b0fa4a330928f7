//! Common types and utilities shared across NoFake crates.
//!
//! This crate defines the provider-agnostic LLM configuration, observability
//! helpers, and the shared error type used throughout the workspace. It is
//! intentionally lightweight so every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmConfig`]: Provider‑agnostic LLM configuration
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`NofakeError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use nofake_common::LlmConfig;
//!
//! let cfg = LlmConfig::Gemini {
//!     api_key: "${GOOGLE_GENERATIVE_AI_API_KEY}".to_string(),
//!     model: "gemini-1.5-flash".to_string(),
//!     json_mode: true,
//! };
//! // An unresolved placeholder is not a credential.
//! assert!(!cfg.has_credential());
//! assert!(!LlmConfig::None.has_credential());
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GOOGLE_GENERATIVE_AI_API_KEY";

/// Configuration for the text-generation provider ("oracle").
///
/// See the `nofake-llm` crate for concrete client implementations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum LlmConfig {
    Gemini {
        api_key: String,
        model: String,
        /// Send the `application/json` response hint.
        #[serde(default = "json_mode_default")]
        json_mode: bool,
    },
    OpenAi {
        api_key: String,
        model: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
    },
    #[default]
    None,
}

impl LlmConfig {
    /// Whether this configuration carries a usable credential.
    ///
    /// Empty keys and `${VAR}` placeholders that survived env expansion
    /// count as absent; both silently select the local fallback path.
    pub fn has_credential(&self) -> bool {
        match self {
            LlmConfig::Gemini { api_key, .. } | LlmConfig::OpenAi { api_key, .. } => {
                let key = api_key.trim();
                !key.is_empty() && !key.contains("${")
            }
            LlmConfig::None => false,
        }
    }

    /// Build a Gemini configuration from [`GEMINI_API_KEY_ENV`], if set.
    pub fn gemini_from_env(model: &str) -> Self {
        match std::env::var(GEMINI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => LlmConfig::Gemini {
                api_key: key,
                model: model.to_string(),
                json_mode: true,
            },
            _ => LlmConfig::None,
        }
    }
}

fn json_mode_default() -> bool {
    true
}

/// Error types used across the NoFake system.
#[derive(thiserror::Error, Debug)]
pub enum NofakeError {
    /// Caller supplied a missing or mistyped field.
    #[error("{0}")]
    Validation(String),

    /// The text-generation provider failed or answered with garbage.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else; never shown to HTTP callers.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl NofakeError {
    pub fn is_validation(&self) -> bool {
        matches!(self, NofakeError::Validation(_))
    }
}

/// Convenient alias for results that use [`NofakeError`].
pub type Result<T> = std::result::Result<T, NofakeError>;
