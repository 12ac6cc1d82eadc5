//! Provider search service.
//!
//! Normalises parameters, consults a short-lived result cache, runs the
//! plan against the configured store and records metrics. Searches tied to
//! a client session go through a per-session [`LatestSearch`], so a newer
//! search from the same session cancels the older one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use moka::future::Cache;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::dispatch::LatestSearch;
use super::params::SearchParams;
use super::plan::SearchPlan;
use super::store::ProviderStore;
use crate::config::SearchSettings;
use crate::filter::PriceBounds;
use crate::metrics::{Metrics, SearchOutcome};
use crate::models::{NewProvider, ProviderProfile};

/// Maximum cached result pages.
const CACHE_MAX_CAPACITY: u64 = 1_000;

/// Maximum tracked search sessions.
const SESSION_MAX_CAPACITY: u64 = 10_000;

/// Idle time after which a session's dispatcher is dropped.
const SESSION_IDLE: Duration = Duration::from_secs(600);

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<ProviderProfile>,
    /// Matches before pagination.
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

/// Search orchestration over a [`ProviderStore`].
pub struct SearchService {
    store: Arc<dyn ProviderStore>,
    metrics: Arc<Metrics>,
    cache: Option<Cache<String, Arc<SearchPage>>>,
    /// Bumped on every write; pages read under an older epoch are not cached.
    epoch: AtomicU64,
    sessions: moka::sync::Cache<String, Arc<LatestSearch>>,
    max_limit: u64,
}

impl SearchService {
    pub fn new(store: Arc<dyn ProviderStore>, metrics: Arc<Metrics>, settings: &SearchSettings) -> Self {
        let cache = (!settings.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_MAX_CAPACITY)
                .time_to_live(settings.cache_ttl)
                .build()
        });

        let sessions = moka::sync::Cache::builder()
            .max_capacity(SESSION_MAX_CAPACITY)
            .time_to_idle(SESSION_IDLE)
            .build();

        Self {
            store,
            metrics,
            cache,
            epoch: AtomicU64::new(0),
            sessions,
            max_limit: settings.max_limit,
        }
    }

    /// Run a search.
    pub async fn search(&self, params: SearchParams) -> Result<Arc<SearchPage>> {
        let start = Instant::now();
        let result = self.execute(params).await;
        let outcome = if result.is_ok() {
            SearchOutcome::Ok
        } else {
            SearchOutcome::Error
        };
        self.metrics
            .record_search(outcome, start.elapsed().as_secs_f64());
        result
    }

    /// Run a search as the latest one for `session`.
    ///
    /// Returns `Ok(None)` when a newer search from the same session
    /// superseded this one before it finished.
    pub async fn search_in_session(
        &self,
        session: &str,
        params: SearchParams,
    ) -> Result<Option<Arc<SearchPage>>> {
        let start = Instant::now();
        let latest = self
            .sessions
            .get_with(session.to_string(), || Arc::new(LatestSearch::new()));

        let result = latest.run(self.execute(params)).await.transpose();
        let outcome = match &result {
            Ok(Some(_)) => SearchOutcome::Ok,
            Ok(None) => SearchOutcome::Superseded,
            Err(_) => SearchOutcome::Error,
        };
        self.metrics
            .record_search(outcome, start.elapsed().as_secs_f64());
        result
    }

    async fn execute(&self, params: SearchParams) -> Result<Arc<SearchPage>> {
        let params = params.normalized();
        let key = params.cache_key();

        if let Some(cache) = &self.cache {
            if let Some(page) = cache.get(&key).await {
                debug!(key = %key, "search cache hit");
                self.metrics.record_cache_hit();
                return Ok(page);
            }
            self.metrics.record_cache_miss();
        }

        let plan = SearchPlan::new(&params, self.max_limit);
        debug!(predicates = plan.predicates.len(), sort = ?plan.sort, "running search");
        let epoch = self.epoch.load(Ordering::Acquire);
        let found = self.store.search(&plan).await?;

        let returned = found.items.len() as u64;
        let page = Arc::new(SearchPage {
            // An empty window can never advance.
            has_more: plan.limit > 0 && plan.offset.saturating_add(returned) < found.total,
            items: found.items,
            total: found.total,
            limit: plan.limit,
            offset: plan.offset,
        });
        self.metrics.record_results(page.items.len());

        if let Some(cache) = &self.cache
            && self.epoch.load(Ordering::Acquire) == epoch
        {
            cache.insert(key.clone(), page.clone()).await;
            // A write may have landed between the check and the insert.
            if self.epoch.load(Ordering::Acquire) != epoch {
                cache.invalidate(&key).await;
            }
        }
        Ok(page)
    }

    /// Load one provider.
    pub async fn provider(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
        self.store.find_by_id(id).await
    }

    /// Add a provider and drop cached result pages.
    ///
    /// Searches still in flight from before the insert do not cache their
    /// pages.
    pub async fn register(&self, provider: NewProvider) -> Result<ProviderProfile> {
        let profile = self.store.insert(provider).await?;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
        Ok(profile)
    }

    pub async fn price_bounds(&self) -> Result<Option<PriceBounds>> {
        self.store.price_bounds().await
    }

    pub async fn healthy(&self) -> bool {
        self.store.healthy().await
    }

    pub fn max_limit(&self) -> u64 {
        self.max_limit
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::search::store::{MemoryProviderStore, StorePage};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    fn service(ttl: Duration, providers: Vec<NewProvider>) -> SearchService {
        let settings = SearchSettings {
            cache_ttl: ttl,
            max_limit: 2,
            statement_timeout_secs: 1,
        };
        SearchService::new(
            Arc::new(MemoryProviderStore::with_providers(providers).unwrap()),
            Arc::new(Metrics::new()),
            &settings,
        )
    }

    fn named(name: &str) -> NewProvider {
        NewProvider {
            display_name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn page_reports_total_and_has_more() {
        let svc = service(Duration::ZERO, vec![named("a"), named("b"), named("c")]);
        let page = svc.search(SearchParams::default()).await.unwrap();
        assert_eq!(page.limit, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_more);

        let last = svc
            .search(SearchParams {
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn cached_page_is_reused_until_register() {
        let svc = service(Duration::from_secs(60), vec![named("a")]);
        let first = svc.search(SearchParams::default()).await.unwrap();
        let second = svc.search(SearchParams::default()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        svc.register(named("b")).await.unwrap();
        let third = svc.search(SearchParams::default()).await.unwrap();
        assert_eq!(third.total, 2);
    }

    #[tokio::test]
    async fn zero_limit_page_has_no_more() {
        let svc = service(Duration::ZERO, vec![named("a")]);
        let page = svc
            .search(SearchParams {
                limit: 0,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
    }

    /// Memory store whose next search parks after reading until released.
    struct GatedStore {
        inner: MemoryProviderStore,
        armed: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProviderStore for GatedStore {
        async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
            let page = self.inner.search(plan).await?;
            if self.armed.swap(false, Ordering::AcqRel) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Ok(page)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ProviderProfile>> {
            self.inner.find_by_id(id).await
        }

        async fn insert(&self, provider: NewProvider) -> Result<ProviderProfile> {
            self.inner.insert(provider).await
        }

        async fn price_bounds(&self) -> Result<Option<PriceBounds>> {
            self.inner.price_bounds().await
        }

        async fn healthy(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn page_read_before_register_is_not_cached() {
        let store = Arc::new(GatedStore {
            inner: MemoryProviderStore::with_providers(vec![named("a")]).unwrap(),
            armed: AtomicBool::new(true),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let settings = SearchSettings {
            cache_ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let svc = Arc::new(SearchService::new(
            store.clone(),
            Arc::new(Metrics::new()),
            &settings,
        ));

        let in_flight = tokio::spawn({
            let svc = svc.clone();
            async move { svc.search(SearchParams::default()).await.unwrap().total }
        });
        store.entered.notified().await;
        svc.register(named("b")).await.unwrap();
        store.release.notify_one();

        assert_eq!(in_flight.await.unwrap(), 1);
        assert_eq!(svc.search(SearchParams::default()).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn session_search_returns_page() {
        let svc = service(Duration::ZERO, vec![named("a")]);
        let page = svc
            .search_in_session("tab-1", SearchParams::default())
            .await
            .unwrap();
        assert_eq!(page.map(|p| p.total), Some(1));
    }
}
