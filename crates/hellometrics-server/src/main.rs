//! hellometrics server
//!
//! - `GET /`        : greeting
//! - `GET /metrics` : request duration histogram, active requests, process stats

use tracing_subscriber::{fmt, EnvFilter};

use hellometrics_core::error::Result;
use hellometrics_server::{app_state, config, server};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code().as_str(), error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_or_default(config::DEFAULT_CONFIG_PATH)?;
    let listen = cfg.server.listen_addr()?;
    let state = app_state::AppState::new(cfg)?;

    tracing::info!(%listen, "hellometrics-server starting");
    let listener = server::bind(listen).await?;

    server::serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
