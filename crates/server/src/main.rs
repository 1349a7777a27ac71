use anyhow::Context;
use deployment::Deployment;
use server::{DeploymentImpl, app};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be populated.
    let _ = dotenvy::dotenv();

    let log_level = std::env::var("RUST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},db={level},deployment={level},local_deployment={level},utils={level},tower_http={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_string));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    let deployment = DeploymentImpl::new()
        .await
        .context("failed to initialise deployment")?;
    let addr = (deployment.config().host, deployment.config().port);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}:{}", addr.0, addr.1))?;
    tracing::info!(address = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app(deployment))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
