//! API aggregator library.
//!
//! Fans a single request out to weather, news and playlist upstreams,
//! caches what is expensive to obtain, and reports per-source latency.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod outcome;
pub mod resilience;
pub mod sources;
pub mod stats;
pub mod transport;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use outcome::{Error, ErrorKind, Outcome};
