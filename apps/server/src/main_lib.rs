use std::sync::Arc;

use anyhow::Context;
use apex_core::cache::{FileCacheStore, LocalAssetCache};
use apex_core::{PortfolioBaseline, SyncCoordinator};
use apex_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, AssetRepository, ChangeNotifier,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub coordinator: Arc<SyncCoordinator>,
}

pub fn init_tracing() {
    let log_format = std::env::var("APEX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the SQLite store, the local cache and the sync coordinator.
///
/// The coordinator is not started here; call `SyncCoordinator::start` once
/// the runtime is ready to serve.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path).context("Failed to prepare the database")?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let notifier = ChangeNotifier::new();
    let repository = Arc::new(AssetRepository::new(
        pool.clone(),
        writer,
        notifier.clone(),
    ));

    let cache = LocalAssetCache::new(Arc::new(FileCacheStore::new(&config.cache_dir)));
    tracing::info!("Local cache directory: {}", config.cache_dir);

    let mut baseline = PortfolioBaseline::new(config.baseline_capital);
    if let Some(cash_parameter) = config.cash_parameter {
        baseline = baseline
            .with_cash_parameter(cash_parameter)
            .context("Invalid APEX_CASH_PARAMETER")?;
    }
    tracing::info!(
        "Baseline capital {}, cash parameter {}",
        baseline.capital,
        baseline.cash_parameter
    );

    let coordinator = Arc::new(SyncCoordinator::new(
        repository,
        Arc::new(notifier),
        cache,
        baseline,
    ));

    Ok(Arc::new(AppState { coordinator }))
}
