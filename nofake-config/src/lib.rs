//! Loader for service configuration with YAML + environment overlays.
//!
//! Every section is optional: a bare environment (no file at all) yields a
//! working configuration that listens on `127.0.0.1:3000` and picks the Gemini
//! key from `GOOGLE_GENERATIVE_AI_API_KEY` when present.
//!
//! Precedence, lowest first: YAML sources in the order they were added, then
//! `NOFAKE_`-prefixed environment variables (`NOFAKE_SERVER__BIND=0.0.0.0:80`).
//! `${VAR}` placeholders in string values are expanded last.
use config::{Config, ConfigError, Environment, File};
use nofake_common::LlmConfig;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Env overrides copied verbatim over the parsed tree; `try_parsing` would
/// otherwise read a digit-only token as a number.
const VERBATIM_ENV_KEYS: [(&str, &str); 1] = [("NOFAKE_LLM__AUTH_TOKEN", "/llm/auth_token")];

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NofakeConfig {
    pub version: Option<String>,
    pub server: ServerSettings,
    pub llm: Option<LlmSettings>,
    pub citations: CitationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// The tag is `provider`; unknown providers fail deserialization.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmSettings {
    Gemini {
        #[serde(default = "default_gemini_model")]
        model: String,
        #[serde(default = "default_gemini_token")]
        auth_token: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        /// Ask Gemini for `application/json` output.
        #[serde(default = "default_json_mode")]
        json_mode: bool,
    },
    Openai {
        #[serde(default = "default_openai_model")]
        model: String,
        auth_token: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<u32>,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl LlmSettings {
    /// Sampling knobs passed on every oracle call.
    pub fn generation(&self) -> (Option<f32>, Option<u32>) {
        match self {
            LlmSettings::Gemini {
                temperature,
                max_tokens,
                ..
            }
            | LlmSettings::Openai {
                temperature,
                max_tokens,
                ..
            } => (*temperature, *max_tokens),
        }
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        match settings {
            LlmSettings::Gemini {
                model,
                auth_token,
                json_mode,
                ..
            } => LlmConfig::Gemini {
                api_key: auth_token.clone(),
                model: model.clone(),
                json_mode: *json_mode,
            },
            LlmSettings::Openai {
                model,
                auth_token,
                endpoint,
                ..
            } => LlmConfig::OpenAi {
                api_key: auth_token.clone(),
                model: model.clone(),
                base_url: endpoint.clone(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CitationSettings {
    /// Probe every citation URL with `HEAD` and swap dead links for a scholar search.
    pub verify_urls: bool,
    /// Fixed seed for placeholder URLs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<PathBuf>,
    pub format: String,
    pub emit_stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: "text".to_string(),
            emit_stderr: true,
            filter: "info".to_string(),
        }
    }
}

impl NofakeConfig {
    /// Resolve the oracle configuration, falling back to the Gemini key in
    /// the process environment when no `llm` section is present.
    pub fn llm_config(&self) -> LlmConfig {
        match &self.llm {
            Some(settings) => LlmConfig::from(settings),
            None => LlmConfig::gemini_from_env(DEFAULT_GEMINI_MODEL),
        }
    }
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}
fn default_json_mode() -> bool {
    true
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_gemini_token() -> String {
    format!("${{{}}}", nofake_common::GEMINI_API_KEY_ENV)
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn restore_verbatim_env(v: &mut Value) {
    for (var, pointer) in VERBATIM_ENV_KEYS {
        if let (Ok(raw), Some(slot)) = (std::env::var(var), v.pointer_mut(pointer)) {
            *slot = Value::String(raw);
        }
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct NofakeConfigLoader {
    files: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for NofakeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl NofakeConfigLoader {
    /// Start empty; environment overrides are layered on at [`load`](Self::load).
    ///
    /// ```
    /// use nofake_config::NofakeConfigLoader;
    ///
    /// let config = NofakeConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nserver:\n  bind: '0.0.0.0:8080'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.server.bind, "0.0.0.0:8080");
    /// assert!(!config.citations.verify_urls);
    /// ```
    pub fn new() -> Self {
        Self {
            files: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so headless deployments can rely
    /// purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files = self
            .files
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use nofake_config::{LlmSettings, NofakeConfigLoader};
    ///
    /// let cfg = NofakeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: "gemini"
    ///   auth_token: "example"
    ///   temperature: 0.3
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// match cfg.llm {
    ///     Some(LlmSettings::Gemini { ref model, ref auth_token, .. }) => {
    ///         assert_eq!(model, "gemini-1.5-flash");
    ///         assert_eq!(auth_token, "example");
    ///     }
    ///     other => panic!("expected gemini settings, got {other:?}"),
    /// }
    /// assert!(cfg.llm_config().has_credential());
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.files = self
            .files
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `NOFAKE_`-prefixed environment variables override file values, then
    /// `${VAR}` placeholders are expanded before materialising the structs.
    pub fn load(self) -> Result<NofakeConfig, ConfigError> {
        let cfg = self
            .files
            .add_source(
                Environment::with_prefix("NOFAKE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        restore_verbatim_env(&mut v);
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
