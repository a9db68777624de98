//! Arena Game Server - authoritative world simulation for a top-down
//! multiplayer arena game
//!
//! Clients join over HTTP, then poll `/update` with their intent and receive
//! a snapshot of the world around them. All simulation happens here.

mod app;
mod config;
mod game;
mod http;
mod util;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::{Config, StepMode};
use crate::game::identity::IdentityCatalog;
use crate::game::FixedRateScheduler;
use crate::http::build_router;
use crate::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Arena Game Server");
    info!(
        addr = %config.server_addr,
        map_size = config.map_size,
        seed = config.map_seed,
        tick_ms = config.tick_rate_ms,
        step_mode = ?config.step_mode,
        "Configuration loaded"
    );

    let catalog = load_catalog(&config);
    info!(identities = catalog.len(), "Identity catalog ready");

    // Create application state
    let state = AppState::new(config.clone(), catalog);

    // Spawn the world scheduler
    if config.step_mode == StepMode::Fixed {
        let scheduler = FixedRateScheduler::new(state.world.clone(), state.clock);
        tokio::spawn(scheduler.run());
    }

    // Build router
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Identity catalog from `COLORS_FILE`, falling back to the built-in list
fn load_catalog(config: &Config) -> IdentityCatalog {
    let Some(path) = &config.colors_file else {
        return IdentityCatalog::builtin();
    };

    match IdentityCatalog::load(path) {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => {
            warn!(path = %path.display(), "Colors file has no entries, using built-in colors");
            IdentityCatalog::builtin()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read colors file, using built-in colors");
            IdentityCatalog::builtin()
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
