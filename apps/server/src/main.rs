//! fidi server: keeps a Firefly III ledger in step with Basiq bank data.

mod api;
mod config;
mod error;
mod main_lib;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let config = Config::from_env()?;
    let state = main_lib::build_state(&config).await?;

    state.scheduler.start().await;

    let app = api::app_router(state.clone());
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.scheduler.stop().await;
    info!("Shut down");
    Ok(())
}

/// `RUST_LOG` filter, `info` when unset. Library `log` records are forwarded
/// to the same subscriber.
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
