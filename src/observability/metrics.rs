//! Metrics collection and exposition.
//!
//! # Metrics
//! - `aggregator_upstream_duration_ms` (histogram): outbound call latency by source
//! - `aggregator_upstream_requests_total` (counter): outbound calls by source, outcome
//! - `aggregator_cache_lookups_total` (counter): cache lookups by key, result
//! - `aggregator_source_failures_total` (counter): failed source fetches by source, code
//! - `aggregator_aggregate_requests_total` (counter): aggregation responses by status

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_histogram!(
        "aggregator_upstream_duration_ms",
        "Outbound call latency in milliseconds."
    );
    describe_counter!("aggregator_upstream_requests_total", "Outbound calls.");
    describe_counter!("aggregator_cache_lookups_total", "Cache lookups.");
    describe_counter!("aggregator_source_failures_total", "Failed source fetches.");
    describe_counter!("aggregator_aggregate_requests_total", "Aggregation responses.");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_upstream_call(source: &str, elapsed_ms: f64, success: bool) {
    histogram!("aggregator_upstream_duration_ms", "source" => source.to_string()).record(elapsed_ms);
    counter!(
        "aggregator_upstream_requests_total",
        "source" => source.to_string(),
        "outcome" => if success { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_cache_lookup(key: &str, hit: bool) {
    counter!(
        "aggregator_cache_lookups_total",
        "key" => key.to_string(),
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

pub fn record_source_failure(source: &str, code: &str) {
    counter!(
        "aggregator_source_failures_total",
        "source" => source.to_string(),
        "code" => code.to_string()
    )
    .increment(1);
}

pub fn record_aggregate(status: u16) {
    counter!("aggregator_aggregate_requests_total", "status" => status.to_string()).increment(1);
}
