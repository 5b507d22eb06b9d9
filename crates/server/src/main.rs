//! swcache server entry point.
//!
//! Boots the MCP server on stdio transport. The activation sweep runs to
//! completion before the first request is served.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use swcache_client::{FetchConfig, HttpFetcher};
use swcache_core::{AppConfig, CacheDb, CacheEngine, WriteMode};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if config.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig::from_app(&config))?;
    let write_mode = if config.detach_writes { WriteMode::Detached } else { WriteMode::Await };
    let engine = CacheEngine::new(db, fetcher, config.policy_table()?, config.bucket_name()).with_write_mode(write_mode);

    match engine.activate().await {
        Ok(report) => tracing::info!(
            bucket = %report.active_bucket,
            entries_removed = report.entries_removed,
            buckets_removed = report.buckets_removed.len(),
            "activated cache generation"
        ),
        Err(e) => tracing::warn!("activation sweep failed: {}", e),
    }

    tracing::info!("Starting swcache server on stdio transport");

    let handler = handler::SwCacheServer::new(Arc::new(engine));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
