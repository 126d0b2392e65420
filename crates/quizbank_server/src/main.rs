//! Quiz bank HTTP server entry point.

use anyhow::Context;
use clap::Parser;
use log::info;
use quizbank_server::config::ServerConfig;
use quizbank_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    let log_dir = config.log_dir().context("failed to resolve log directory")?;
    quizbank_core::init_logging(config.log_level(), &log_dir)?;

    // Fail fast on an unreadable or too-new database before accepting traffic.
    quizbank_core::db::open_db(&config.db_path).with_context(|| {
        format!("failed to open database `{}`", config.db_path.display())
    })?;

    let app = router(AppState::new(config.db_path.clone()));
    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .with_context(|| format!("failed to bind {}", config.address))?;

    info!(
        "event=server_start module=server status=ok address={} db_path={} version={}",
        config.address,
        config.db_path.display(),
        quizbank_core::core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=server_stop module=server status=error error={err}");
    }
}
