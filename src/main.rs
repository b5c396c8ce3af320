// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crm_server::{
    api::router,
    auth::{PasswordVerifier, TokenService, BCRYPT_COST},
    config::ServerConfig,
    state::AppState,
    storage::{DocumentStorage, StoragePaths},
    telemetry,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // The subscriber is not up yet.
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init_tracing(config.log_format) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = DocumentStorage::new(StoragePaths::new(&config.data_dir));
    storage.initialize()?;
    tracing::info!(data_dir = %config.data_dir.display(), "Document store ready");

    let passwords = PasswordVerifier::new(BCRYPT_COST)?;
    let tokens = TokenService::new(&config.auth);
    let state = AppState::new(storage, tokens, passwords, config.environment);
    let app = router(state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.environment,
        "CRM server listening (docs at /docs)"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or (on Unix) SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received, draining connections");
    token.cancel();
}
