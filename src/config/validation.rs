//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Keep retries and the per-source deadline inside the inbound timeout
//! - Validate addresses and upstream URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Missing API keys are allowed; the upstream rejects the call and the
//!   source degrades to absent

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;
use crate::resilience::backoff::worst_case_call;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError::new("timeouts.upstream_ms", "must be greater than 0"));
    }
    if config.timeouts.source_ms == 0 {
        errors.push(ValidationError::new("timeouts.source_ms", "must be greater than 0"));
    } else if config.timeouts.source() >= config.timeouts.request() {
        errors.push(ValidationError::new(
            "timeouts.source_ms",
            "must be less than timeouts.request_secs",
        ));
    }

    // Every attempt and backoff sleep of one call must fit the inbound deadline.
    let worst_case = worst_case_call(&config.retries, config.timeouts.upstream_ms);
    if config.timeouts.request_secs > 0 && worst_case >= config.timeouts.request() {
        errors.push(ValidationError::new(
            "timeouts.upstream_ms",
            format!(
                "{} attempts of {} ms plus backoff take up to {} ms, not under timeouts.request_secs",
                config.retries.max_attempts,
                config.timeouts.upstream_ms,
                worst_case.as_millis()
            ),
        ));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.cache.weather_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.weather_ttl_secs", "must be greater than 0"));
    }
    if config.cache.token_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.token_ttl_secs", "must be greater than 0"));
    }
    if config.cache.lock_timeout_ms == 0 {
        errors.push(ValidationError::new("cache.lock_timeout_ms", "must be greater than 0"));
    }

    check_url(&mut errors, "weather.api_url", &config.weather.api_url);
    check_url(&mut errors, "news.api_url", &config.news.api_url);
    check_url(&mut errors, "playlist.token_url", &config.playlist.token_url);
    check_url(&mut errors, "playlist.api_url", &config.playlist.api_url);

    if config.weather.location.trim().is_empty() {
        errors.push(ValidationError::new("weather.location", "must not be empty"));
    }
    if config.news.query.trim().is_empty() {
        errors.push(ValidationError::new("news.query", "must not be empty"));
    }
    if config.playlist.playlist_id.trim().is_empty() {
        errors.push(ValidationError::new("playlist.playlist_id", "must not be empty"));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{other}', expected 'pretty' or 'json'"),
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}
