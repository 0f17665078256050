use anyhow::{Context, Result};
use connector_host::api::{create_router, ApiState};
use connector_host::registry::get_all_connectors;
use flowlink::config::HostConfig;
use flowlink::ReqwestTransport;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connector_host=info,flowlink=info".into()),
        )
        .init();

    info!("Connector host starting...");

    let config = HostConfig::from_env().context("Failed to load host configuration")?;
    let secrets = config.secret_store();

    info!(
        host = %config.server.host,
        port = config.server.port,
        secrets = ?secrets.names(),
        "Configuration loaded"
    );

    let connectors = get_all_connectors(&config.endpoints);
    info!(count = connectors.len(), "Connectors registered");

    let api_state = ApiState {
        connectors,
        secrets: Arc::new(secrets),
        transport: Arc::new(ReqwestTransport::new()),
    };
    let router = create_router(api_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Connector API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Connector API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Connector host stopped");

    Ok(())
}
