// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, process::ExitCode, sync::Arc};

use tokio::signal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use investment_gateway::{
    blockchain::{AlgodClient, AlgorandLedger, AppSpec},
    config::{Config, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    server,
    state::AppState,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine; the environment may be set directly.
    dotenv::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Investment gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let app_spec = AppSpec::load(&config.app_spec_path)?;
    tracing::info!(
        contract = app_spec.contract_name(),
        path = %config.app_spec_path.display(),
        "Application specification loaded"
    );

    let client = AlgodClient::new(&config.node)?;
    tracing::info!(node = client.base_url(), "Using algod node");

    let ledger = AlgorandLedger::new(client, Arc::new(app_spec), config.ledger_settings());
    let state = AppState::new(Arc::new(ledger)).with_settings(config.operations);

    let server = server::start(config.bind_addr, state).await?;
    shutdown_signal().await;
    server.stop().await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer().pretty().with_target(true)).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
