// Copyright (c) 2026 Pet Operator Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Gateway HTTP server

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use pet_operator_core::application::AuthorizedGateway;
use pet_operator_core::domain::operator_config::OperatorConfig;
use pet_operator_core::infrastructure::engine_client::EngineClient;
use pet_operator_core::presentation::api;

pub async fn serve(
    config_path: Option<PathBuf>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = OperatorConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    if let Some(host) = host_override {
        config.spec.server.bind_address = host;
    }
    if let Some(port) = port_override {
        config.spec.server.port = port;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        owner_user_id = %config.spec.owner.user_id,
        engine = %config.spec.engine.base_url,
        require_login = config.spec.engine.require_login,
        "Configuration loaded"
    );

    let engine = Arc::new(EngineClient::new(
        config.spec.engine.base_url.clone(),
        config.spec.engine.timeouts.policy(),
    ));
    let gateway = Arc::new(
        AuthorizedGateway::from_config(&config, engine).context("Failed to initialize gateway")?,
    );

    let app = api::app(gateway);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
