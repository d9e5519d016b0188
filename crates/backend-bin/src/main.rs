use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use naan_backend::{
    config::{Settings, DEFAULT_CONFIG_FILE},
    ws_router, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Kiosk notification hub
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Settings file, layered under `NAAN_*` environment variables
    #[arg(long, env = "NAAN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind_addr: Option<SocketAddr>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading settings from {}", args.config.display()))?;
    if let Some(addr) = args.bind_addr {
        settings.bind_addr = addr;
    }
    if args.json_logs {
        settings.json_logs = true;
    }

    init_tracing(&settings);

    if settings.uses_dev_secret() {
        tracing::warn!("jwt_secret is the development default; set NAAN_JWT_SECRET");
    }

    let addr = settings.bind_addr;
    let state = AppState::new(settings);
    let app = ws_router::create_router(state.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "naan hub listening");

    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    // Upgraded kiosk connections outlive the HTTP server; let each one
    // release its room and send a close frame.
    state.connections.close();
    let drain = state.settings.hub.write_timeout() * 2;
    if tokio::time::timeout(drain, state.connections.wait()).await.is_err() {
        tracing::warn!(
            remaining = state.connections.len(),
            "kiosk connections still open after shutdown grace period"
        );
    }

    tracing::info!("naan hub stopped");
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => tracing::error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
