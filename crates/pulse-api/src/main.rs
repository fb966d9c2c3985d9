//! # pulse-api: Binary Entry Point
//!
//! Loads `.env`, validates configuration, confirms the ledger source is
//! reachable, then serves on `0.0.0.0:PORT` until Ctrl-C.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use pulse_api::config::AppConfig;
use pulse_api::error::StartupError;
use pulse_api::state::AppState;
use pulse_rpc::{RpcClient, RpcConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the environment may be set directly.
    dotenvy::dotenv().ok();

    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pulse-api stopped");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("PULSE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run() -> Result<(), StartupError> {
    let rpc_config = RpcConfig::from_env()?;
    let config = AppConfig::from_env()?;
    tracing::info!(rpc = ?rpc_config, scan = ?config.scan, "configuration loaded");

    let client = RpcClient::new(rpc_config).map_err(StartupError::RpcClient)?;
    let head = client
        .block_number()
        .await
        .map_err(StartupError::SourceUnreachable)?;
    tracing::info!(head = %head, "ledger source reachable");

    let port = config.port;
    let app = pulse_api::app(AppState::new(Arc::new(client), config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    tracing::info!("pulse-api listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("pulse-api shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
