//! Proxy Cache - a read-through caching layer in front of Redis
//!
//! Serves key lookups over HTTP from a fixed-capacity LRU cache with lazy TTL
//! expiry, falling back to the backing store on a miss.

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proxycache::api::create_router;
use proxycache::{AppState, CacheWorker, Config, LruCache, RateLimiter, RedisStore};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the Redis backing store client and the cache engine
/// 4. Move the cache onto its dedicated worker thread
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured address
/// 7. On SIGINT/SIGTERM stop accepting requests, then drain the worker
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proxycache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting caching proxy");

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: max_keys={}, ttl_ms={}, redis={}:{}, rate_limit_rps={}, queue_capacity={}",
        config.max_keys,
        config.ttl_ms,
        config.redis_host,
        config.redis_port,
        config.rate_limit_rps,
        config.worker_queue_capacity
    );

    let store = RedisStore::new(&config.redis_host, config.redis_port)
        .context("invalid Redis address")?;
    let cache = LruCache::new(config.max_keys, config.ttl(), store)?;
    let worker = CacheWorker::spawn(cache, config.worker_queue_capacity)
        .context("failed to start cache worker")?;

    let limiter = RateLimiter::new(config.rate_limit_rps, config.rate_limit_burst);
    let state = AppState::new(worker.handle(), limiter);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    worker.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
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
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
