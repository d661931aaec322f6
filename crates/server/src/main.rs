//! transit-mcp server entry point.
//!
//! This is the main binary that boots the worker and serves it as an MCP
//! server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use transit_client::{FetchClient, FetchConfig, Worker, WorkerConfig};
use transit_core::{AppConfig, CacheDb};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.origin,
        version = %config.cache_version,
        db_path = %config.db_path.display(),
        "Starting transit-mcp server on stdio transport"
    );

    let storage = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let worker = Arc::new(Worker::new(WorkerConfig::from_app_config(&config)?, storage, network)?);

    match worker.boot().await {
        Ok(report) => tracing::info!(
            namespace = %report.activate.namespace,
            fetched = report.install.fetched,
            deleted = report.activate.deleted.len(),
            "worker active"
        ),
        Err(e) => tracing::warn!(error = %e, "boot failed; retry with worker_install and worker_activate"),
    }

    let handler = handler::TransitServer::new(worker.clone());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    worker.flush().await;

    Ok(())
}
