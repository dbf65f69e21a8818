//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::transport::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

const USER_AGENT: &str = concat!("api-aggregator/", env!("CARGO_PKG_VERSION"));

/// Plain HTTP transport with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Upstream HTTP client created");
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&request.url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransportError::Body {
            url: request.url.to_string(),
            message: e.to_string(),
        })?;

        Ok(UpstreamResponse { status, body })
    }
}
