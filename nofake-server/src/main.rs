use anyhow::{Context, Result};
use clap::Parser;
use nofake_common::observability::{LogConfig, LogFormat, init_logging};
use nofake_config::{NofakeConfig, NofakeConfigLoader};
use nofake_server::{AppState, build_router};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nofake", version, about = "News credibility and citation service")]
struct Cli {
    /// YAML configuration file; missing is fine, defaults apply.
    #[arg(long, default_value = "nofake.yaml")]
    config: PathBuf,

    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg: NofakeConfig = NofakeConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    // 2) Logging from the `logging` section
    let log_path = init_logging(LogConfig {
        app_name: "nofake",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr,
        format: LogFormat::from_name(&cfg.logging.format),
        default_filter: cfg.logging.filter.clone(),
    })?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %log_path.display(),
        "server.starting"
    );

    let state = AppState::from_config(&cfg)?;
    let bind = cli.bind.unwrap_or_else(|| cfg.server.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(%bind, "server.listening");

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("server.shutdown.requested");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "server.signal.unavailable"),
            }
        }
    });

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("server error")?;

    info!("server.stopped");
    Ok(())
}
