//! Upstream source clients.
//!
//! # Data Flow
//! ```text
//! Aggregator
//!     → SourceClient::fetch(params)
//!     → (weather, playlist token) CacheAside::get_or_fetch
//!     → Transport::send(UpstreamRequest)
//!     → decode_response (status, blank body, JSON shape)
//!     → Outcome<Payload>
//! ```
//!
//! # Design Decisions
//! - Every recoverable failure becomes a `Failure` where it is detected
//! - Each source owns its error catalog (`<source>.failed_response`, ...)
//! - Payload models are permissive: unknown fields are ignored, most fields default

pub mod news;
pub mod playlist;
pub mod weather;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::observability::metrics;
use crate::outcome::{Error, ErrorCatalog, Outcome};
use crate::transport::{TransportError, UpstreamResponse};

pub use news::{Article, ArticleSource, NewsClient, NewsFeed};
pub use playlist::{AccessToken, Playlist, PlaylistClient};
pub use weather::{WeatherClient, WeatherForecast};

/// A typed fetch against one upstream API.
#[async_trait]
pub trait SourceClient: Send + Sync {
    type Params: Send + 'static;
    type Payload: Send + 'static;

    /// Name used in statistics, logs and error codes.
    fn source(&self) -> &'static str;

    async fn fetch(&self, params: Self::Params) -> Outcome<Self::Payload>;
}

/// Join `path` onto a configured base URL.
pub(crate) fn endpoint(base: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Report and return a source failure.
pub(crate) fn fail<T>(source: &str, error: Error) -> Outcome<T> {
    tracing::error!(source, code = %error.code, error = %error.description, "Upstream fetch failed");
    metrics::record_source_failure(source, &error.code);
    Outcome::failure(error)
}

/// Failure for a URL that could not be built from configuration.
pub(crate) fn invalid_endpoint<T>(
    source: &str,
    catalog: &ErrorCatalog,
    err: url::ParseError,
) -> Outcome<T> {
    fail(
        source,
        catalog
            .failed_response
            .clone()
            .with_details(json!({ "error": format!("invalid endpoint: {err}") })),
    )
}

/// Turn a transport result into a typed outcome.
pub(crate) fn decode_response<T: DeserializeOwned>(
    source: &str,
    catalog: &ErrorCatalog,
    result: Result<UpstreamResponse, TransportError>,
) -> Outcome<T> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            return fail(
                source,
                catalog
                    .failed_response
                    .clone()
                    .with_details(json!({ "error": e.to_string() })),
            )
        }
    };

    if !response.is_success() {
        return fail(
            source,
            catalog.failed_response.clone().with_details(json!({
                "status": response.status.as_u16(),
                "body": truncate(&response.body, 512),
            })),
        );
    }

    if response.body.trim().is_empty() {
        return fail(source, catalog.empty_response.clone());
    }

    match serde_json::from_str::<T>(&response.body) {
        Ok(value) => Outcome::success(value),
        Err(e) => fail(
            source,
            catalog
                .malformed_response
                .clone()
                .with_details(json!({ "error": e.to_string() })),
        ),
    }
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
