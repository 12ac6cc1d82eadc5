//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::LocationCatalog;
use crate::config::{Config, SearchSettings, StoreKind};
use crate::db;
use crate::metrics::Metrics;
use crate::search::{
    MemoryProviderStore, PgProviderStore, ProviderStore, SearchService, load_seed_file,
};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Provider search.
    search: Arc<SearchService>,

    /// City/district catalog.
    catalog: Arc<LocationCatalog>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// For the Postgres store this connects and applies migrations; for the
    /// memory store it loads `SEED_FILE` when one is configured.
    pub async fn new(config: &Config) -> Result<Self> {
        let catalog =
            LocationCatalog::load(&config.locations_file).context("failed to load locations")?;

        let store: Arc<dyn ProviderStore> = match config.store {
            StoreKind::Postgres => {
                let pool = db::create_pool(config)
                    .await
                    .context("failed to create database pool")?;
                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;
                info!("PostgreSQL store ready");
                Arc::new(PgProviderStore::new(
                    pool,
                    config.search.statement_timeout_secs,
                ))
            }
            StoreKind::Memory => {
                let seed = match &config.seed_file {
                    Some(path) => load_seed_file(path)?,
                    None => Vec::new(),
                };
                let store = MemoryProviderStore::with_providers(seed)
                    .context("failed to seed memory store")?;
                info!(providers = store.len(), "memory store ready");
                Arc::new(store)
            }
        };

        Ok(Self::with_store(store, catalog, &config.search))
    }

    /// Assemble state around an existing store.
    pub fn with_store(
        store: Arc<dyn ProviderStore>,
        catalog: LocationCatalog,
        settings: &SearchSettings,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let search = Arc::new(SearchService::new(store, metrics.clone(), settings));

        Self {
            inner: Arc::new(AppStateInner {
                search,
                catalog: Arc::new(catalog),
                metrics,
            }),
        }
    }

    pub fn search(&self) -> &Arc<SearchService> {
        &self.inner.search
    }

    pub fn catalog(&self) -> &Arc<LocationCatalog> {
        &self.inner.catalog
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Check if the provider store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.search.healthy().await
    }
}
