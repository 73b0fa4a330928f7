use nofake_common::LlmConfig;
use nofake_config::{LlmSettings, NofakeConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load_with_expansion() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
server:
  bind: "0.0.0.0:8080"
llm:
  provider: gemini
  model: "gemini-1.5-pro"
  auth_token: "${NOFAKE_TEST_GEMINI_KEY}"
  temperature: 0.2
  max_tokens: 2048
citations:
  verify_urls: true
  seed: 7
logging:
  format: json
  emit_stderr: false
"#;
    let p = write_yaml(&tmp, "nofake.yaml", file_yaml);

    temp_env::with_var("NOFAKE_TEST_GEMINI_KEY", Some("abc-123"), || {
        let config = NofakeConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load service config");

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.citations.verify_urls);
        assert_eq!(config.citations.seed, Some(7));
        assert_eq!(config.logging.format, "json");
        assert!(!config.logging.emit_stderr);

        let llm = config.llm.as_ref().expect("llm section");
        assert_eq!(llm.generation(), (Some(0.2), Some(2048)));
        match config.llm_config() {
            LlmConfig::Gemini {
                api_key,
                model,
                json_mode,
            } => {
                assert_eq!(api_key, "abc-123");
                assert_eq!(model, "gemini-1.5-pro");
                assert!(json_mode);
            }
            other => panic!("expected gemini config, got {other:?}"),
        }
    });
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "nofake.yaml", "server:\n  bind: \"127.0.0.1:1\"\n");

    temp_env::with_var("NOFAKE_SERVER__BIND", Some("127.0.0.1:9999"), || {
        let config = NofakeConfigLoader::new().with_file(&p).load().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    });
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("absent.yaml");

    temp_env::with_var_unset("GOOGLE_GENERATIVE_AI_API_KEY", || {
        let config = NofakeConfigLoader::new()
            .with_optional_file(&absent)
            .load()
            .expect("defaults");

        assert_eq!(config.server.bind, nofake_config::DEFAULT_BIND);
        assert!(config.llm.is_none());
        assert!(!config.llm_config().has_credential());
        assert!(config.citations.seed.is_none());
    });
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let absent = tmp.path().join("absent.yaml");
    assert!(NofakeConfigLoader::new().with_file(absent).load().is_err());
}

#[test]
#[serial]
fn unresolved_gemini_placeholder_is_not_a_credential() {
    temp_env::with_var_unset("GOOGLE_GENERATIVE_AI_API_KEY", || {
        let config = NofakeConfigLoader::new()
            .with_yaml_str("llm:\n  provider: gemini\n")
            .load()
            .unwrap();
        assert!(matches!(config.llm, Some(LlmSettings::Gemini { .. })));
        assert!(!config.llm_config().has_credential());
    });
}

#[test]
#[serial]
fn openai_provider_keeps_endpoint() {
    let config = NofakeConfigLoader::new()
        .with_yaml_str(
            r#"
llm:
  provider: openai
  auth_token: "sk-test"
  endpoint: "https://gateway.example.com/v1/"
"#,
        )
        .load()
        .unwrap();

    match config.llm_config() {
        LlmConfig::OpenAi {
            model, base_url, ..
        } => {
            assert_eq!(model, nofake_config::DEFAULT_OPENAI_MODEL);
            assert_eq!(base_url.as_deref(), Some("https://gateway.example.com/v1/"));
        }
        other => panic!("expected openai config, got {other:?}"),
    }
}

#[test]
#[serial]
fn gemini_json_hint_can_be_disabled() {
    let config = NofakeConfigLoader::new()
        .with_yaml_str("llm:\n  provider: gemini\n  auth_token: \"k\"\n  json_mode: false\n")
        .load()
        .unwrap();

    match config.llm_config() {
        LlmConfig::Gemini { json_mode, .. } => assert!(!json_mode),
        other => panic!("expected gemini config, got {other:?}"),
    }
}

#[test]
#[serial]
fn digit_only_env_token_stays_a_string() {
    temp_env::with_vars(
        [
            ("NOFAKE_LLM__PROVIDER", Some("gemini")),
            ("NOFAKE_LLM__AUTH_TOKEN", Some("0012345")),
        ],
        || {
            let config = NofakeConfigLoader::new().load().expect("numeric token loads");
            match config.llm_config() {
                LlmConfig::Gemini { api_key, .. } => assert_eq!(api_key, "0012345"),
                other => panic!("expected gemini config, got {other:?}"),
            }
        },
    );
}
