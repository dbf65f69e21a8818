//! Outbound HTTP transport.
//!
//! # Data Flow
//! ```text
//! source client builds UpstreamRequest { source tag, method, url, auth, form }
//!     → timing.rs     (measure, report to LatencyTracker)
//!     → resilience    (retry idempotent calls with backoff)
//!     → client.rs     (reqwest, per-attempt timeout)
//!     → UpstreamResponse { status, body } | TransportError
//! ```
//!
//! # Design Decisions
//! - The source tag travels on the request, never derived from the URL
//! - Transport failures are values; source clients turn them into outcomes
//! - One stack instance is shared by all source clients

pub mod client;
pub mod timing;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::AppConfig;
use crate::resilience::retries::RetryingTransport;
use crate::stats::LatencyTracker;

pub use client::ReqwestTransport;
pub use timing::TimingTransport;

/// One outbound call.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Source name used for statistics and logs.
    pub source: &'static str,
    pub method: Method,
    pub url: Url,
    pub bearer_token: Option<String>,
    pub form: Option<Vec<(String, String)>>,
}

impl UpstreamRequest {
    pub fn get(source: &'static str, url: Url) -> Self {
        Self {
            source,
            method: Method::GET,
            url,
            bearer_token: None,
            form: None,
        }
    }

    pub fn post_form(source: &'static str, url: Url, form: Vec<(String, String)>) -> Self {
        Self {
            source,
            method: Method::POST,
            url,
            bearer_token: None,
            form: Some(form),
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn is_idempotent(&self) -> bool {
        self.method.is_idempotent()
    }
}

/// Status and body text of an upstream answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Failure to obtain any response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("network error calling {url}: {message}")]
    Network { url: String, message: String },

    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl TransportError {
    pub fn from_reqwest(url: &Url, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else {
            TransportError::Network {
                url,
                message: err.to_string(),
            }
        }
    }
}

/// An outbound HTTP capability.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Build the shared `timing → retry → reqwest` stack.
pub fn build_transport(
    config: &AppConfig,
    tracker: Arc<LatencyTracker>,
) -> Result<Arc<dyn Transport>, reqwest::Error> {
    let client = ReqwestTransport::new(Duration::from_millis(config.timeouts.upstream_ms))?;
    let retrying = RetryingTransport::new(client, config.retries.clone());
    Ok(Arc::new(TimingTransport::new(retrying, tracker)))
}
