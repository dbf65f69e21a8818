//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the aggregator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound and outbound timeouts.
    pub timeouts: TimeoutConfig,

    /// Retry policy for idempotent upstream calls.
    pub retries: RetryConfig,

    /// Cache TTLs and lock wait.
    pub cache: CacheConfig,

    pub weather: WeatherConfig,

    pub news: NewsConfig,

    pub playlist: PlaylistConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total inbound request timeout in seconds.
    pub request_secs: u64,

    /// Per-attempt upstream timeout in milliseconds.
    pub upstream_ms: u64,

    /// Deadline for one source within an aggregation, in milliseconds.
    /// A source that misses it is reported as failed; the others still answer.
    pub source_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_ms: 5_000,
            source_ms: 25_000,
        }
    }
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn source(&self) -> Duration {
        Duration::from_millis(self.source_ms)
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub enabled: bool,

    /// Total attempts including the first one.
    pub max_attempts: u32,

    pub base_delay_ms: u64,

    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2_000,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Weather forecast TTL (default: 24 hours).
    pub weather_ttl_secs: u64,

    /// Playlist access token TTL (default: 3000 seconds).
    pub token_ttl_secs: u64,

    /// Bounded wait for a key's population lock.
    pub lock_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_secs: 24 * 60 * 60,
            token_ttl_secs: 3000,
            lock_timeout_ms: 5000,
        }
    }
}

impl CacheConfig {
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Weather upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_url: String,
    pub api_key: String,

    /// Location requested by the aggregate endpoint.
    pub location: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: String::new(),
            location: "Athens,GR".to_string(),
        }
    }
}

/// News upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_url: String,
    pub api_key: String,

    /// Search query requested by the aggregate endpoint.
    pub query: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://newsapi.org/v2".to_string(),
            api_key: String::new(),
            query: "AI".to_string(),
        }
    }
}

/// Playlist upstream (client-credentials token + playlist lookup).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub token_url: String,
    pub api_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub playlist_id: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            playlist_id: "3cEYpjA9oz9GiPac4AsH4n".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
