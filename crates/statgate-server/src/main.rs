//! statgate: an HTTP facade over a slow, quota-limited game-statistics
//! provider, with a TTL+LRU cache, a circuit breaker, hint-aware retries,
//! and stale-fallback degradation between the handlers and the upstream.

use statgate_server::{build_router, AppConfig, AppState};
use statgate_upstream::{HttpFetcher, HttpFetcherConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("statgate={level},statgate_server={level},info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "startup configuration invalid");
            std::process::exit(1);
        }
    };

    let mut fetcher_config = HttpFetcherConfig::new(config.api_key.clone());
    fetcher_config.app_id = config.app_id;
    fetcher_config.timeout = config.timeouts.api_timeout;
    let fetch = match HttpFetcher::new(fetcher_config) {
        Ok(fetch) => Arc::new(fetch),
        Err(error) => {
            tracing::error!(%error, "failed to build the upstream client");
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr;
    let shutdown_grace = config.shutdown_grace;
    let state = match AppState::build(config, fetch) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "failed to wire application state");
            std::process::exit(1);
        }
    };

    let root_token = CancellationToken::new();
    let sweeper = statgate_cache::spawn_sweeper(Arc::clone(&state.cache), root_token.clone());

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, addr = %bind_addr, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %bind_addr, "statgate listening");

    let cache = Arc::clone(&state.cache);
    let breaker = Arc::clone(&state.breaker);
    let app = build_router(state);

    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(statgate_server::shutdown::shutdown_signal(
            root_token.clone(),
            shutdown_grace,
        ));

    if let Err(error) = serve.await {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }

    // Drained cleanly within the grace period: stop the sweeper, close the
    // shared components, and exit 0 before the watchdog fires.
    root_token.cancel();
    let sweeper_grace = cache.shutdown_grace();
    cache.shutdown();
    breaker.shutdown();
    let _ = tokio::time::timeout(sweeper_grace, sweeper).await;
    tracing::info!("shutdown complete");
}
