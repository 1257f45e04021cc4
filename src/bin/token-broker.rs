//! OAuth2 token broker server binary.
//!
//! Loads configuration from the environment, opens the credential store, and serves
//! the exchange and refresh endpoints with graceful shutdown.

use anyhow::Result;
use std::{env, sync::Arc};
use token_broker::{
    config::Config,
    http::{AppState, build_router},
    oauth::ReqwestUpstreamClient,
    storage::{create_storage_backend, parse_storage_backend},
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "token_broker=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = token_broker::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{version}");
            std::process::exit(0);
        }
    });

    tracing::info!(?version, "Starting token broker");

    let config = Config::new()?;

    // Build HTTP client with certificate bundles
    let mut client_builder = reqwest::Client::builder();
    for ca_certificate in config.certificate_bundles.as_ref() {
        tracing::info!("Loading CA certificate: {:?}", ca_certificate);
        let cert = std::fs::read(ca_certificate)?;
        let cert = reqwest::Certificate::from_pem(&cert)?;
        client_builder = client_builder.add_root_certificate(cert);
    }

    client_builder = client_builder
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref());
    let http_client = client_builder.build()?;

    let upstream = Arc::new(ReqwestUpstreamClient::new(
        http_client,
        config.token_endpoint.as_ref().clone(),
    ));
    tracing::info!(token_endpoint = %upstream.token_endpoint(), "Using token endpoint");

    // Parse storage backend configuration and open it; failure here is fatal
    let storage_backend = parse_storage_backend(
        &config.storage_backend,
        config.database_url.as_deref(),
        &config.token_store_path,
    )?;
    let credential_store = create_storage_backend(storage_backend).await?;

    // Setup graceful shutdown; in-flight exchanges share the tracker so they finish first
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    let app_context = AppState::new(
        Arc::new(config.clone()),
        upstream,
        credential_store,
        tracker.clone(),
    );
    let app = build_router(app_context);

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Bind before spawning so a taken port fails startup
    let http_port = *config.http_port.as_ref();
    let bind_address = format!("0.0.0.0:{http_port}");
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Starting server on {bind_address}");

    {
        let inner_token = token.clone();
        tracker.spawn(async move {
            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_token.cancelled().await;
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
