//! OIDC login service
//!
//! Single-binary relying party that:
//! 1. Loads client configuration (optionally one section of the file)
//! 2. Discovers the identity provider's endpoints
//! 3. Redirects browsers to the provider on `/login`
//! 4. Exchanges the code and returns the user profile on `/callback`

mod args;
mod metrics;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use oidc_client::{ClientConfig, DiscoveredClient};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Args;
use crate::routes::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs, level from LOG_LEVEL or RUST_LOG
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting oidc-login");

    let prometheus_handle = metrics::install_recorder()?;

    let argv: Vec<String> = std::env::args().collect();
    let args = Args::parse(&argv)?;

    let config_path = ClientConfig::resolve_path(args.config_path.as_deref());
    info!(
        path = %config_path.display(),
        section = args.section.as_deref().unwrap_or("<root>"),
        "loading configuration"
    );

    let client = DiscoveredClient::from_file(&config_path, args.section.as_deref())
        .await
        .with_context(|| {
            format!(
                "failed to initialize OIDC client from {}",
                config_path.display()
            )
        })?;

    info!(
        client_id = %client.config().client_id,
        redirect_uri = %client.config().redirect_uri,
        auth_mode = %args.auth_mode,
        "client ready"
    );

    let app = build_router(AppState {
        client: Arc::new(client),
        auth_mode: args.auth_mode,
        prometheus: prometheus_handle,
    });

    let listener = TcpListener::bind(args.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
