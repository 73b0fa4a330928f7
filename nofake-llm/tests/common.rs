use std::sync::OnceLock;

use nofake_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "nofake-tests",
            emit_stderr: true,
            format: std::env::var("NOFAKE_LOG_FORMAT")
                .map(|raw| LogFormat::from_name(&raw))
                .unwrap_or(LogFormat::Text),
            default_filter: "debug".to_string(),
            ..LogConfig::default()
        };

        nofake_common::observability::init_logging(config).unwrap_or_default()
    });
}
