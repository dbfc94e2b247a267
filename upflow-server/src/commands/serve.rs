//! Serve command - run the HTTP API

use anyhow::{Context, Result};

use super::get_context;
use crate::api::{app_router, AppState};

pub fn run() -> Result<()> {
    let ctx = get_context()?;
    let listen_addr = ctx.config.listen_addr;
    let cors_origins = ctx.config.cors_origins.clone();

    // Declared before the runtime so the blocking Up client is dropped
    // after the runtime shuts down, never on one of its workers
    let state = AppState::new(ctx);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async {
        let router = app_router(state.clone(), &cors_origins)?;

        let listener = tokio::net::TcpListener::bind(listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", listen_addr))?;
        tracing::info!("Listening on {}", listen_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        tracing::info!("Server stopped");
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
