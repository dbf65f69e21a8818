//! Latency-recording transport wrapper.

use std::sync::Arc;
use async_trait::async_trait;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::stats::LatencyTracker;
use crate::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// Wraps a transport and reports every call's wall-clock time, success or not.
pub struct TimingTransport<T> {
    inner: T,
    tracker: Arc<LatencyTracker>,
}

impl<T> TimingTransport<T> {
    pub fn new(inner: T, tracker: Arc<LatencyTracker>) -> Self {
        Self { inner, tracker }
    }
}

#[async_trait]
impl<T: Transport> Transport for TimingTransport<T> {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let source = request.source;
        let start = Instant::now();

        let result = self.inner.send(request).await;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1_000.0;
        let bucket = self.tracker.record(source, elapsed_ms);

        let success = matches!(&result, Ok(response) if response.is_success());
        metrics::record_upstream_call(source, elapsed_ms, success);
        tracing::debug!(source, elapsed_ms, bucket = ?bucket, success, "Upstream call finished");

        result
    }
}
