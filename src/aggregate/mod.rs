//! Fan-out over the three sources.
//!
//! # Data Flow
//! ```text
//! GET /aggregate?sortBy=&filterBy=
//!     → Aggregator::aggregate(query)
//!     → spawn weather / news / playlist fetches (independent tasks)
//!     → join all three (no short-circuit)
//!     → news: articles::filter_and_sort
//!     → Outcome<AggregateResponse> | all_sources_unavailable
//! ```
//!
//! # Design Decisions
//! - One failed source is an absent section, not a failed request
//! - A panicking source task counts as that source's failure
//! - Each source has its own deadline; a late source fails alone
//! - Post-processing is pure and never triggers upstream calls

pub mod articles;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::{JoinError, JoinHandle};

use crate::observability::metrics;
use crate::outcome::{global, Error, ErrorKind, Outcome};
use crate::sources::{NewsFeed, Playlist, SourceClient, WeatherForecast};

pub use articles::{filter_and_sort, SortBy};

pub type WeatherSource = Arc<dyn SourceClient<Params = String, Payload = WeatherForecast>>;
pub type NewsSource = Arc<dyn SourceClient<Params = String, Payload = NewsFeed>>;
pub type PlaylistSource = Arc<dyn SourceClient<Params = (), Payload = Playlist>>;

/// Deadline for one source when none is configured.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(25);

/// Caller options for an aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateQuery {
    pub sort_by: Option<String>,
    pub filter_by: Option<String>,
}

impl AggregateQuery {
    pub fn sort(&self) -> Option<SortBy> {
        self.sort_by.as_deref().and_then(SortBy::parse)
    }
}

/// Combined payload. Failed sources serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResponse {
    pub weather: Option<WeatherForecast>,
    pub news: Option<NewsFeed>,
    pub playlist: Option<Playlist>,
}

pub struct Aggregator {
    weather: WeatherSource,
    news: NewsSource,
    playlist: PlaylistSource,
    location: String,
    query: String,
    source_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        weather: WeatherSource,
        news: NewsSource,
        playlist: PlaylistSource,
        location: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            weather,
            news,
            playlist,
            location: location.into(),
            query: query.into(),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub async fn aggregate(&self, query: AggregateQuery) -> Outcome<AggregateResponse> {
        // Spawn everything before awaiting anything.
        let deadline = self.source_timeout;
        let weather_task = spawn_fetch(self.weather.clone(), self.location.clone(), deadline);
        let news_task = spawn_fetch(self.news.clone(), self.query.clone(), deadline);
        let playlist_task = spawn_fetch(self.playlist.clone(), (), deadline);

        let (weather, news, playlist) = tokio::join!(weather_task, news_task, playlist_task);
        let weather = settle(self.weather.source(), weather);
        let news = settle(self.news.source(), news);
        let playlist = settle(self.playlist.source(), playlist);

        if weather.failed() && news.failed() && playlist.failed() {
            tracing::error!("All upstream sources failed");
            let details = json!({
                self.weather.source(): weather.error(),
                self.news.source(): news.error(),
                self.playlist.source(): playlist.error(),
            });
            return Outcome::failure(global::ALL_SOURCES_UNAVAILABLE.with_details(details));
        }

        for (source, failed) in [
            (self.weather.source(), weather.failed()),
            (self.news.source(), news.failed()),
            (self.playlist.source(), playlist.failed()),
        ] {
            if failed {
                tracing::warn!(source, "Source unavailable, returning partial aggregate");
            }
        }

        let sort_by = query.sort();
        let news = news.ok().map(|mut feed| {
            feed.articles = filter_and_sort(feed.articles, query.filter_by.as_deref(), sort_by);
            feed
        });

        Outcome::success(AggregateResponse {
            weather: weather.ok(),
            news,
            playlist: playlist.ok(),
        })
    }
}

fn spawn_fetch<P, T>(
    client: Arc<dyn SourceClient<Params = P, Payload = T>>,
    params: P,
    deadline: Duration,
) -> JoinHandle<Outcome<T>>
where
    P: Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        match tokio::time::timeout(deadline, client.fetch(params)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let source = client.source();
                tracing::warn!(
                    source,
                    timeout_ms = deadline.as_millis() as u64,
                    "Source missed its deadline"
                );
                let error = deadline_exceeded(source, deadline);
                metrics::record_source_failure(source, &error.code);
                Outcome::failure(error)
            }
        }
    })
}

/// `<source>.failed_response` for a fetch cut off by its deadline.
fn deadline_exceeded(source: &str, deadline: Duration) -> Error {
    Error {
        code: Cow::Owned(format!("{source}.failed_response")),
        kind: ErrorKind::UpstreamUnavailable,
        description: Cow::Borrowed("Source did not answer within its deadline"),
        debug_details: Some(json!({ "timeoutMs": deadline.as_millis() as u64 })),
    }
}

fn settle<T>(source: &str, joined: Result<Outcome<T>, JoinError>) -> Outcome<T> {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(source, error = %e, "Source task terminated unexpectedly");
            metrics::record_source_failure(source, &global::SOURCE_TASK_FAILED.code);
            Outcome::failure(
                global::SOURCE_TASK_FAILED.with_details(json!({ "source": source })),
            )
        }
    }
}
