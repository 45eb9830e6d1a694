//! Banner Cache - read-through banner lookups over an in-process LFU cache
//!
//! Serves banner content over HTTP, shielding the backing store with an LFU
//! cache that expires entries lazily.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banner_cache::api::{create_router, AppState};
use banner_cache::cache::{CacheBuilder, ChannelSink};
use banner_cache::config::Config;
use banner_cache::service::{BannerService, BannerSource, InMemoryBannerSource};
use banner_cache::spawn_eviction_drain;

/// Main entry point for the banner server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Load the banner store (optionally seeded from a JSON file)
/// 4. Start the eviction drain task and build the cache around its channel
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banner_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting banner cache server");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: capacity={}, eviction_batch_size={}, ttl={}s, backpressure={}, port={}",
        config.cache_capacity,
        config.eviction_batch_size,
        config.cache_ttl,
        config.eviction_backpressure,
        config.server_port
    );

    let source = match &config.banner_seed_file {
        Some(path) => InMemoryBannerSource::from_json_file(path)
            .await
            .with_context(|| format!("failed to load banners from {}", path.display()))?,
        None => InMemoryBannerSource::new(),
    };
    info!("Banner store loaded with {} banners", source.len().await);
    let source: Arc<dyn BannerSource> = Arc::new(source);

    let (sink, evictions) = ChannelSink::bounded(config.eviction_channel_capacity);
    let drain_handle = spawn_eviction_drain(evictions);

    let cache = CacheBuilder::from_config(&config)
        .eviction_sink(Arc::new(sink), config.eviction_backpressure)
        .build()
        .context("invalid cache configuration")?;
    info!("Cache initialized");

    let state = AppState::new(BannerService::new(
        Arc::new(cache),
        source,
        config.cache_ttl(),
    ));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router (and with it the cache's sink) is gone, so the drain finishes.
    match drain_handle.await {
        Ok(consumed) => info!("Eviction drain finished after {} events", consumed),
        Err(err) => warn!("Eviction drain task failed: {}", err),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
