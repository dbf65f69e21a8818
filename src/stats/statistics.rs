//! Running statistics for one upstream source.

use serde::Serialize;

/// Latency class of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBucket {
    /// Under 100 ms.
    Fast,
    /// 100 ms to 200 ms, both inclusive.
    Medium,
    /// Over 200 ms.
    Slow,
}

impl LatencyBucket {
    pub const FAST_BELOW_MS: f64 = 100.0;
    pub const MEDIUM_UP_TO_MS: f64 = 200.0;

    pub fn classify(elapsed_ms: f64) -> Self {
        if elapsed_ms < Self::FAST_BELOW_MS {
            LatencyBucket::Fast
        } else if elapsed_ms <= Self::MEDIUM_UP_TO_MS {
            LatencyBucket::Medium
        } else {
            LatencyBucket::Slow
        }
    }
}

/// Aggregated timings for one source.
///
/// Serializes to the report shape; raw samples stay in-process.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_requests: u64,
    pub fast_count: u64,
    pub medium_count: u64,
    pub slow_count: u64,
    pub average_response_time_ms: f64,
    #[serde(skip)]
    pub samples: Vec<f64>,
    #[serde(skip)]
    total_ms: f64,
}

impl Statistics {
    /// Apply one sample. Callers must hold exclusive access.
    pub(crate) fn observe(&mut self, elapsed_ms: f64) -> LatencyBucket {
        let bucket = LatencyBucket::classify(elapsed_ms);
        match bucket {
            LatencyBucket::Fast => self.fast_count += 1,
            LatencyBucket::Medium => self.medium_count += 1,
            LatencyBucket::Slow => self.slow_count += 1,
        }

        self.total_requests += 1;
        self.samples.push(elapsed_ms);
        // Summed in recording order, same as averaging the sample list.
        self.total_ms += elapsed_ms;
        self.average_response_time_ms = self.total_ms / self.samples.len() as f64;

        bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(LatencyBucket::classify(0.0), LatencyBucket::Fast);
        assert_eq!(LatencyBucket::classify(99.0), LatencyBucket::Fast);
        assert_eq!(LatencyBucket::classify(99.999), LatencyBucket::Fast);
        assert_eq!(LatencyBucket::classify(100.0), LatencyBucket::Medium);
        assert_eq!(LatencyBucket::classify(200.0), LatencyBucket::Medium);
        assert_eq!(LatencyBucket::classify(200.5), LatencyBucket::Slow);
        assert_eq!(LatencyBucket::classify(201.0), LatencyBucket::Slow);
    }

    #[test]
    fn test_observe_updates_every_field() {
        let mut stats = Statistics::default();
        stats.observe(10.0);
        stats.observe(20.0);

        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.fast_count, 2);
        assert_eq!(stats.samples, vec![10.0, 20.0]);
        assert_eq!(stats.average_response_time_ms, 15.0);
    }

    #[test]
    fn test_report_omits_samples() {
        let mut stats = Statistics::default();
        stats.observe(150.0);

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalRequests"], 1);
        assert_eq!(value["mediumCount"], 1);
        assert_eq!(value["averageResponseTimeMs"], 150.0);
        assert!(value.get("samples").is_none());
    }
}
