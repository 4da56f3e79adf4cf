//! Fund Proxy - mobile API proxy with a selective response cache
//!
//! Sits between the mobile client and the backend business suite.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fund_proxy::{api::create_router, spawn_sweep_task, AppState, Config};

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache service and backend client
/// 4. Start background TTL sweep task
/// 5. Create Axum router with the cache layer and forwarding fallback
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fund_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fund Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={}, env={:?}, port={}, max_entries={}, cleanup_interval={}s, cache_enabled={}",
        config.backend_url,
        config.environment,
        config.server_port,
        config.cache.max_entries,
        config.cleanup_interval,
        config.cache.enabled
    );
    info!(
        "TTLs: portfolio={}s, profile={}s, transaction={}s, success_policy={:?}",
        config.cache.ttl.portfolio.as_secs(),
        config.cache.ttl.profile.as_secs(),
        config.cache.ttl.transaction.as_secs(),
        config.cache.success_policy
    );

    let state = AppState::from_config(&config).context("failed to initialize application state")?;
    info!(backend = state.backend.base_url(), "Response cache initialized");

    let sweep_handle = spawn_sweep_task(state.cache.store(), config.cleanup_interval);
    info!("Background sweep task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Proxy listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Proxy shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    sweep_handle.abort();
    warn!("Sweep task aborted");
}
