//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search (outcomes, duration, per-key short-circuits)
//! - Image relay (upstream fetch outcomes)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches total by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mangashelf_searches_total", "Total search requests"),
        &["outcome"], // "matched", "no_match", "empty_query", "error"
    )
    .expect("searches_total metric")
});

/// End-to-end search duration in seconds (resolution + enrichment).
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "mangashelf_search_duration_seconds",
            "Duration of search resolution and enrichment",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
    )
    .expect("search_duration metric")
});

/// Filter keys emptied by a value with no matching reference row.
pub static SEARCH_SHORT_CIRCUITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mangashelf_search_short_circuits_total",
            "Filter keys resolved to nothing because a value matched no reference",
        ),
        &["key"],
    )
    .expect("search_short_circuits metric")
});

// =============================================================================
// Image Relay Metrics
// =============================================================================

/// Upstream image fetches by outcome.
pub static PROXY_FETCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mangashelf_proxy_fetches_total", "Upstream image fetches"),
        &["outcome"], // "success", "upstream_error", "failed"
    )
    .expect("proxy_fetches_total metric")
});

/// All core metrics, for registration by the server.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(SEARCH_SHORT_CIRCUITS.clone()),
        Box::new(PROXY_FETCHES_TOTAL.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        SEARCHES_TOTAL.with_label_values(&["matched"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"mangashelf_searches_total".to_string()));
    }
}
