//! Metrics for cache and remote-call behaviour.
//!
//! Recorded through the `metrics` facade; whichever recorder the embedding
//! process installs receives them.

use std::fmt;

/// All metric names used by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Cache manager
    CacheHits,
    CacheMisses,
    CacheStores,
    CacheFlushes,
    CacheKeysFlushed,
    CacheErrors,

    // Remote caller
    RemoteCallsSuccess,
    RemoteCallsError,
    RemoteCallDuration,

    // Query translator
    QueryRuns,
    QueryFailures,
    QueryFoundPosts,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CacheHits => "eventbrite_cache_hits_total",
            MetricName::CacheMisses => "eventbrite_cache_misses_total",
            MetricName::CacheStores => "eventbrite_cache_stores_total",
            MetricName::CacheFlushes => "eventbrite_cache_flushes_total",
            MetricName::CacheKeysFlushed => "eventbrite_cache_keys_flushed_total",
            MetricName::CacheErrors => "eventbrite_cache_errors_total",
            MetricName::RemoteCallsSuccess => "eventbrite_remote_calls_success_total",
            MetricName::RemoteCallsError => "eventbrite_remote_calls_error_total",
            MetricName::RemoteCallDuration => "eventbrite_remote_call_duration_seconds",
            MetricName::QueryRuns => "eventbrite_query_runs_total",
            MetricName::QueryFailures => "eventbrite_query_failures_total",
            MetricName::QueryFoundPosts => "eventbrite_query_found_posts",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn emit_counter(name: MetricName, value: u64) {
    ::metrics::counter!(name.as_str()).increment(value);
}

pub fn emit_endpoint_counter(name: MetricName, endpoint: &str) {
    ::metrics::counter!(name.as_str(), "endpoint" => endpoint.to_string()).increment(1);
}

pub fn emit_histogram(name: MetricName, value: f64) {
    ::metrics::histogram!(name.as_str()).record(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for name in [MetricName::CacheHits, MetricName::RemoteCallDuration, MetricName::QueryFoundPosts] {
            assert!(name.to_string().starts_with("eventbrite_"));
        }
    }
}
