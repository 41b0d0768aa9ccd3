//! chartkeeper - web server entry point

use anyhow::Context;
use chartkeeper::{api::create_router, config::Config, logging, state::AppState};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chartkeeper", about = "REST server for patient records", version)]
struct Args {
    /// Configuration file (toml, yaml or json). Defaults to ./config.* when present.
    #[arg(short, long, env = "RECORDS_CONFIG")]
    config: Option<String>,

    /// Seed file loaded into the store at startup; overrides `rest.seed_file`.
    #[arg(long)]
    seed: Option<String>,

    /// Port to listen on; overrides `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        config.rest.seed_file = Some(seed);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting chartkeeper");

    let addr = config
        .socket_addr()
        .context("Failed to determine socket address")?;
    let base_path = config.rest.base_path.clone();

    tracing::info!(
        listen_addr = %addr,
        base_path = %base_path,
        seed_file = config.rest.seed_file.as_deref(),
        "Configuration loaded"
    );

    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;

    tracing::info!(
        resources = ?state.registry.names(),
        patients_indexed = state.search_index.len("patient").await,
        "Resources registered"
    );

    let app = create_router(state);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API endpoint: http://{}{}", addr, base_path);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener on {addr}"))?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server terminated unexpectedly");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("SIGINT received, starting graceful shutdown...");
        }
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, starting graceful shutdown...");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
