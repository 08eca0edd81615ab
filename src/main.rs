use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use control_figure_ingest::config::ServiceConfig;
use control_figure_ingest::{GrpcServer, IngestEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "control_figure_ingest=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Control Figure Ingest Service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = ServiceConfig::from_env().context("failed to load configuration")?;

    info!("Configuration loaded:");
    info!("  gRPC Port: {}", config.grpc_port);
    info!("  Database: {}", config.database_url);

    let engine = Arc::new(
        IngestEngine::new(&config.database_url)
            .await
            .context("failed to initialize ingest engine")?,
    );

    let grpc_server = GrpcServer::new(engine.clone());
    let grpc_addr: SocketAddr = ([0, 0, 0, 0], config.grpc_port).into();
    let grpc_handle = tokio::spawn(async move {
        if let Err(e) = grpc_server.start(grpc_addr).await {
            error!("gRPC server error: {}", e);
        }
    });

    info!("gRPC server listening on {}", grpc_addr);

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal, gracefully shutting down...");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }

    grpc_handle.abort();

    info!("Control Figure Ingest Service shutdown complete");
    Ok(())
}
