//! Concurrent latency registry.

use std::collections::BTreeMap;

use dashmap::DashMap;

use crate::stats::statistics::{LatencyBucket, Statistics};

/// Thread-safe map of source name to [`Statistics`].
///
/// Shared through `Arc` between the timing transports and the HTTP layer.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    sources: DashMap<String, Statistics>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outbound call for `source`.
    pub fn record(&self, source: &str, elapsed_ms: f64) -> LatencyBucket {
        // Look up first so the hot path does not allocate the key.
        if let Some(mut stats) = self.sources.get_mut(source) {
            return stats.observe(elapsed_ms);
        }
        self.sources
            .entry(source.to_string())
            .or_default()
            .observe(elapsed_ms)
    }

    /// Consistent copy of all records, ordered by source name.
    pub fn snapshot(&self) -> BTreeMap<String, Statistics> {
        self.sources
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Copy of a single source's record.
    pub fn get(&self, source: &str) -> Option<Statistics> {
        self.sources.get(source).map(|entry| entry.value().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
