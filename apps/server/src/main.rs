use apex_server::api::app_router;
use apex_server::config::Config;
use apex_server::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    // A failed initial load is not fatal; the cached snapshot is served until the store answers
    if let Err(e) = state.coordinator.start().await {
        tracing::warn!("Initial asset load failed: {}", e);
    }

    let router = app_router(state.clone(), &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.coordinator.teardown();
    state.coordinator.flush_cache().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
