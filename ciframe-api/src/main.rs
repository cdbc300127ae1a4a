//! ciframe-api - Chord-similarity song catalog service
//!
//! Loads the song corpus once, builds the chord and genre indices, then
//! serves read-only JSON queries until shut down. A corpus that fails to
//! load stops startup before the listener is bound.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ciframe_api::{build_router, logging, AppState};
use ciframe_common::config::{Config, ConfigOverrides, DEFAULT_LOG_LEVEL};
use ciframe_common::{loader, Catalog};
use clap::Parser;
use tokio::signal;
use tracing::info;

/// Command-line arguments for ciframe-api
#[derive(Parser, Debug)]
#[command(name = "ciframe-api")]
#[command(about = "Chord-similarity song catalog service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CIFRAME_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "CIFRAME_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CIFRAME_PORT")]
    port: Option<u16>,

    /// Corpus file
    #[arg(short, long, env = "CIFRAME_DATA")]
    data: Option<PathBuf>,

    /// Lifetime of cached similarity results, in seconds
    #[arg(long, env = "CIFRAME_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Similarity computations allowed to run at once
    #[arg(long, env = "CIFRAME_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Give up waiting for a similarity slot after this many milliseconds
    #[arg(long, env = "CIFRAME_GATE_TIMEOUT_MS")]
    gate_timeout_ms: Option<u64>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "CIFRAME_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            data_path: self.data.clone(),
            cache_ttl_secs: self.cache_ttl_secs,
            max_concurrent_similarity: self.max_concurrent,
            gate_acquire_timeout_ms: self.gate_timeout_ms,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter_handle =
        logging::init(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));

    let config = Config::load(args.config.as_deref(), args.overrides())
        .context("Failed to load configuration")?;
    logging::apply_configured_level(&filter_handle, &config.log_level)
        .context("Failed to apply configured log level")?;

    info!(
        "Starting Ciframe API (ciframe-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Index construction completes before any request is accepted
    let rows = loader::load_rows(&config.data_path)
        .with_context(|| format!("Failed to load corpus {}", config.data_path.display()))?;
    let catalog = Catalog::build(rows).context("Failed to build catalog")?;

    info!(
        "Similarity gate: {} concurrent, acquire timeout {:?}; cache TTL {:?}",
        config.max_concurrent_similarity, config.gate_acquire_timeout, config.cache_ttl
    );

    let state = AppState::with_memory_cache(
        catalog,
        config.max_concurrent_similarity,
        config.gate_acquire_timeout,
        config.cache_ttl,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("ciframe-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
