//! Retrying transport wrapper.
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH (non-idempotent)
//! - Network errors and 429/502/503/504 are retryable; other statuses are final
//! - Attempts are bounded by `max_attempts`

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// Whether an attempt's result warrants another try.
pub fn is_retryable(status: Option<StatusCode>, network_error: bool) -> bool {
    if network_error {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::TOO_MANY_REQUESTS)
            | Some(StatusCode::BAD_GATEWAY)
            | Some(StatusCode::SERVICE_UNAVAILABLE)
            | Some(StatusCode::GATEWAY_TIMEOUT)
    )
}

/// Retries idempotent requests with exponential backoff.
pub struct RetryingTransport<T> {
    inner: T,
    config: RetryConfig,
}

impl<T> RetryingTransport<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn max_attempts_for(&self, request: &UpstreamRequest) -> u32 {
        if self.config.enabled && request.is_idempotent() {
            self.config.max_attempts.max(1)
        } else {
            1
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let max_attempts = self.max_attempts_for(&request);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let result = self.inner.send(request.clone()).await;

            let retry = match &result {
                Ok(response) => is_retryable(Some(response.status), false),
                Err(_) => is_retryable(None, true),
            };
            if !retry || attempts >= max_attempts {
                return result;
            }

            let delay = calculate_backoff(attempts, &self.config);
            match &result {
                Ok(response) => tracing::info!(
                    source = request.source,
                    attempt = attempts,
                    delay = ?delay,
                    status = %response.status,
                    "Retrying upstream request"
                ),
                Err(e) => tracing::info!(
                    source = request.source,
                    attempt = attempts,
                    delay = ?delay,
                    error = %e,
                    "Retrying upstream request after network error"
                ),
            }
            tokio::time::sleep(delay).await;
        }
    }
}
