//! Per-source upstream latency statistics.
//!
//! # Data Flow
//! ```text
//! transport::timing (every outbound call)
//!     → LatencyTracker::record(source, elapsed_ms)
//!     → per-source Statistics (bucket counters, samples, mean)
//!
//! GET /statistics
//!     → LatencyTracker::snapshot()
//! ```
//!
//! # Design Decisions
//! - Sharded concurrent map; each record is updated under its shard's write lock
//! - Snapshots copy records, so readers never see a half-applied update
//! - Bucket boundaries are inclusive on the medium band: 100..=200 ms

pub mod statistics;
pub mod tracker;

pub use statistics::{LatencyBucket, Statistics};
pub use tracker::LatencyTracker;
