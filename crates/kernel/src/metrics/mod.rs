//! Prometheus metrics collection.
//!
//! Provides search metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// How a search request ended.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum SearchOutcome {
    Ok,
    Error,
    Superseded,
}

/// Search request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct SearchLabels {
    pub outcome: SearchOutcome,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// Search requests by outcome.
    pub search_requests: Family<SearchLabels, Counter>,

    /// Search duration, including cache lookups.
    pub search_duration_seconds: Histogram,

    pub search_cache_hits: Counter,

    pub search_cache_misses: Counter,

    /// Items returned per page.
    pub search_results_returned: Histogram,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let search_requests = Family::<SearchLabels, Counter>::default();
        registry.register(
            "search_requests",
            "Total provider search requests",
            search_requests.clone(),
        );

        let search_duration_seconds = Histogram::new(exponential_buckets(0.0005, 2.0, 14));
        registry.register(
            "search_duration_seconds",
            "Provider search duration in seconds",
            search_duration_seconds.clone(),
        );

        let search_cache_hits = Counter::default();
        registry.register(
            "search_cache_hits",
            "Search result cache hits",
            search_cache_hits.clone(),
        );

        let search_cache_misses = Counter::default();
        registry.register(
            "search_cache_misses",
            "Search result cache misses",
            search_cache_misses.clone(),
        );

        let search_results_returned = Histogram::new(exponential_buckets(1.0, 2.0, 8));
        registry.register(
            "search_results_returned",
            "Providers returned per search page",
            search_results_returned.clone(),
        );

        Self {
            registry,
            search_requests,
            search_duration_seconds,
            search_cache_hits,
            search_cache_misses,
            search_results_returned,
        }
    }

    /// Record a finished search.
    pub fn record_search(&self, outcome: SearchOutcome, duration_secs: f64) {
        self.search_requests
            .get_or_create(&SearchLabels { outcome })
            .inc();
        self.search_duration_seconds.observe(duration_secs);
    }

    pub fn record_results(&self, count: usize) {
        self.search_results_returned.observe(count as f64);
    }

    pub fn record_cache_hit(&self) {
        self.search_cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.search_cache_misses.inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if encoding into a `String` fails, which `fmt::Write` for
    /// `String` never does.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}
